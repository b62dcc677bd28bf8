use rand::Rng;

use crate::error::{DomainError, DomainResult};

/// PNR alphabet: uppercase letters and digits, a 36^6 keyspace.
const PNR_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Every PNR is exactly this long.
pub const PNR_LEN: usize = 6;

/// Fresh draws a commit may spend before reporting a transient failure.
pub const PNR_MAX_ATTEMPTS: usize = 5;

/// Draw one candidate PNR. Uniqueness is enforced at ledger insertion, not
/// here.
pub fn generate_pnr<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PNR_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..PNR_CHARSET.len());
            PNR_CHARSET[idx] as char
        })
        .collect()
}

/// Draw until the candidate is not claimed by `taken`, bounded by
/// [`PNR_MAX_ATTEMPTS`].
///
/// Collisions are astronomically rare at this keyspace, so exhausting the
/// bound is reported as a transient failure the caller may retry, not as a
/// hard error.
pub fn unique_pnr<R, F>(rng: &mut R, mut taken: F) -> DomainResult<String>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    for _ in 0..PNR_MAX_ATTEMPTS {
        let candidate = generate_pnr(rng);
        if !taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(DomainError::Transient(
        "could not draw an unused PNR".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pnr_format() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let pnr = generate_pnr(&mut rng);
            assert_eq!(pnr.len(), PNR_LEN);
            assert!(pnr
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_unique_pnr_never_duplicates_existing() {
        let mut rng = rand::thread_rng();
        let mut issued: HashSet<String> = HashSet::new();

        // Simulate a populated booking set growing by 100k reservations.
        for _ in 0..100_000 {
            let pnr = unique_pnr(&mut rng, |c| issued.contains(c)).unwrap();
            assert!(issued.insert(pnr), "unique_pnr returned a duplicate");
        }
    }

    #[test]
    fn test_unique_pnr_exhaustion_is_transient() {
        let mut rng = rand::thread_rng();
        let err = unique_pnr(&mut rng, |_| true).unwrap_err();
        assert!(matches!(err, DomainError::Transient(_)));
    }
}
