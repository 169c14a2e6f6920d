use serde::{Deserialize, Serialize};

/// Staff role (spec.md §3, "Role"). Ordered deliberately so `RoleClass::of`
/// below reads as a straightforward partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    RegisteredNurse,
    LicensedPracticalNurse,
    CertifiedNursingAssistant,
    NursePractitioner,
    ClinicalNurseSpecialist,
    CertifiedRegisteredNurseAnesthetist,
    ResidentPhysician,
    AttendingPhysician,
    Surgeon,
    Cardiologist,
    AdminClerk,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::RegisteredNurse,
        Role::LicensedPracticalNurse,
        Role::CertifiedNursingAssistant,
        Role::NursePractitioner,
        Role::ClinicalNurseSpecialist,
        Role::CertifiedRegisteredNurseAnesthetist,
        Role::ResidentPhysician,
        Role::AttendingPhysician,
        Role::Surgeon,
        Role::Cardiologist,
        Role::AdminClerk,
    ];

    pub fn class(self) -> RoleClass {
        match self {
            Role::RegisteredNurse
            | Role::LicensedPracticalNurse
            | Role::CertifiedNursingAssistant
            | Role::NursePractitioner
            | Role::ClinicalNurseSpecialist
            | Role::CertifiedRegisteredNurseAnesthetist => RoleClass::Nurse,
            Role::AttendingPhysician | Role::Surgeon | Role::Cardiologist => RoleClass::Attending,
            Role::ResidentPhysician => RoleClass::Resident,
            Role::AdminClerk => RoleClass::Admin,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REGISTERED_NURSE" => Ok(Role::RegisteredNurse),
            "LICENSED_PRACTICAL_NURSE" => Ok(Role::LicensedPracticalNurse),
            "CERTIFIED_NURSING_ASSISTANT" => Ok(Role::CertifiedNursingAssistant),
            "NURSE_PRACTITIONER" => Ok(Role::NursePractitioner),
            "CLINICAL_NURSE_SPECIALIST" => Ok(Role::ClinicalNurseSpecialist),
            "CERTIFIED_REGISTERED_NURSE_ANESTHETIST" => Ok(Role::CertifiedRegisteredNurseAnesthetist),
            "RESIDENT_PHYSICIAN" => Ok(Role::ResidentPhysician),
            "ATTENDING_PHYSICIAN" => Ok(Role::AttendingPhysician),
            "SURGEON" => Ok(Role::Surgeon),
            "CARDIOLOGIST" => Ok(Role::Cardiologist),
            "ADMIN_CLERK" => Ok(Role::AdminClerk),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::RegisteredNurse => "REGISTERED_NURSE",
            Role::LicensedPracticalNurse => "LICENSED_PRACTICAL_NURSE",
            Role::CertifiedNursingAssistant => "CERTIFIED_NURSING_ASSISTANT",
            Role::NursePractitioner => "NURSE_PRACTITIONER",
            Role::ClinicalNurseSpecialist => "CLINICAL_NURSE_SPECIALIST",
            Role::CertifiedRegisteredNurseAnesthetist => "CERTIFIED_REGISTERED_NURSE_ANESTHETIST",
            Role::ResidentPhysician => "RESIDENT_PHYSICIAN",
            Role::AttendingPhysician => "ATTENDING_PHYSICIAN",
            Role::Surgeon => "SURGEON",
            Role::Cardiologist => "CARDIOLOGIST",
            Role::AdminClerk => "ADMIN_CLERK",
        };
        write!(f, "{s}")
    }
}

/// Scheduling grouping (GLOSSARY, "Role class"). Each of the four ILP
/// optimizers (C7) operates on exactly one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleClass {
    Nurse,
    Attending,
    Resident,
    Admin,
}

impl RoleClass {
    pub const ALL: [RoleClass; 4] = [
        RoleClass::Nurse,
        RoleClass::Attending,
        RoleClass::Resident,
        RoleClass::Admin,
    ];

    pub fn roles(self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| r.class() == self).collect()
    }
}

/// Runtime pooled-staff resource group gating treatment start (GLOSSARY,
/// "Pooled staff group"). Only nurse-class, ATTENDING_PHYSICIAN, and
/// RESIDENT_PHYSICIAN are pooled — surgeons/cardiologists/APRNs are not
/// gating resources for treatment start (spec.md §4.4, §9 open question).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffGroup {
    Nurses,
    Physicians,
    Residents,
}

impl StaffGroup {
    pub const ALL: [StaffGroup; 3] = [StaffGroup::Nurses, StaffGroup::Physicians, StaffGroup::Residents];

    /// Which roles' configured counts are summed into this pool at init
    /// (spec.md §4.4 "Initialization").
    pub fn pooled_roles(self) -> Vec<Role> {
        match self {
            StaffGroup::Nurses => RoleClass::Nurse.roles(),
            StaffGroup::Physicians => vec![Role::AttendingPhysician],
            StaffGroup::Residents => vec![Role::ResidentPhysician],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nurse_class_has_six_roles() {
        assert_eq!(RoleClass::Nurse.roles().len(), 6);
    }

    #[test]
    fn physicians_pool_excludes_surgeons_and_cardiologists() {
        let pooled = StaffGroup::Physicians.pooled_roles();
        assert_eq!(pooled, vec![Role::AttendingPhysician]);
    }
}
