use rand::rngs::StdRng;
use rand::SeedableRng;

/// Construct the single seedable RNG stream every run hangs off of
/// (spec.md §4.3 "RNG is a single seedable stream so runs are
/// reproducible."; §8 property 6). Every cell that samples randomness
/// takes a `&mut StdRng` rather than owning its own source, so a whole
/// orchestrator cycle advances one shared stream deterministically.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
