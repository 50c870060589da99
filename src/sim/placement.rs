//! Rejection-sampled placement of spawned entities

use rand::Rng;

/// A placed value and whether it passed the placement constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<T> {
    pub value: T,
    /// False when the attempt budget ran out and the value is unchecked
    pub checked: bool,
}

/// Draw candidates until one is accepted or `attempts` are spent
///
/// On exhaustion one more candidate is drawn and returned unchecked, so
/// initialization never fails or loops forever on a crowded layout.
pub fn place_with_rejection<R, T, S, A>(
    rng: &mut R,
    attempts: u32,
    mut sample: S,
    mut accept: A,
) -> Placement<T>
where
    R: Rng + ?Sized,
    S: FnMut(&mut R) -> T,
    A: FnMut(&T) -> bool,
{
    for _ in 0..attempts {
        let candidate = sample(rng);
        if accept(&candidate) {
            return Placement {
                value: candidate,
                checked: true,
            };
        }
    }

    log::debug!("placement: no valid spot after {} attempts, using unchecked fallback", attempts);
    Placement {
        value: sample(rng),
        checked: false,
    }
}
