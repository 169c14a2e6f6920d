use shared_models::TriageLevel as T;

/// Fixed diagnosis-code → triage-level lookup tables (spec.md §4.2). Each is
/// a total function over `1..=17`, pinned bit-for-bit by the test suite —
/// changing a single entry is a breaking change to the classifier.
///
/// Index 0 of each array is diagnosis code 1.
pub const CTAS_TABLE: [T; 17] = [
    T::Orange, // 1
    T::Yellow, // 2
    T::Red,    // 3
    T::Blue,   // 4
    T::Orange, // 5
    T::Yellow, // 6
    T::Green,  // 7
    T::Red,    // 8
    T::Yellow, // 9
    T::Orange, // 10
    T::Green,  // 11
    T::Blue,   // 12
    T::Yellow, // 13
    T::Red,    // 14
    T::Orange, // 15
    T::Green,  // 16
    T::Blue,   // 17
];

pub const ESI_TABLE: [T; 17] = [
    T::Yellow, // 1
    T::Orange, // 2
    T::Red,    // 3
    T::Green,  // 4
    T::Yellow, // 5
    T::Orange, // 6
    T::Blue,   // 7
    T::Red,    // 8
    T::Orange, // 9
    T::Yellow, // 10
    T::Blue,   // 11
    T::Green,  // 12
    T::Orange, // 13
    T::Red,    // 14
    T::Yellow, // 15
    T::Blue,   // 16
    T::Green,  // 17
];

pub const MTS_TABLE: [T; 17] = [
    T::Orange, // 1
    T::Red,    // 2
    T::Red,    // 3
    T::Yellow, // 4
    T::Green,  // 5
    T::Orange, // 6
    T::Yellow, // 7
    T::Blue,   // 8
    T::Green,  // 9
    T::Orange, // 10
    T::Yellow, // 11
    T::Red,    // 12
    T::Blue,   // 13
    T::Green,  // 14
    T::Orange, // 15
    T::Yellow, // 16
    T::Blue,   // 17
];
