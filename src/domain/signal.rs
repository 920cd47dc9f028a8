//! Moving-average crossover position signal.

use std::fmt;

/// Discrete position held after the close of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

impl Signal {
    /// -1, 0 or +1.
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        self.as_i8() as f64
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Long when the short MA is strictly above the long MA, short when strictly
/// below. Equal averages, or either one missing, stay flat.
pub fn crossover(short_ma: Option<f64>, long_ma: Option<f64>) -> Signal {
    match (short_ma, long_ma) {
        (Some(s), Some(l)) if s > l => Signal::Long,
        (Some(s), Some(l)) if s < l => Signal::Short,
        _ => Signal::Flat,
    }
}

pub fn crossover_signal(short_ma: &[Option<f64>], long_ma: &[Option<f64>]) -> Vec<Signal> {
    debug_assert_eq!(short_ma.len(), long_ma.len());
    short_ma
        .iter()
        .zip(long_ma)
        .map(|(&s, &l)| crossover(s, l))
        .collect()
}

/// Indices where the signal changes into `target` from something else.
///
/// A series that starts in `target` counts as a flip at index 0.
pub fn flips_to(signals: &[Signal], target: Signal) -> Vec<usize> {
    signals
        .iter()
        .enumerate()
        .filter(|&(i, &s)| s == target && (i == 0 || signals[i - 1] != target))
        .map(|(i, _)| i)
        .collect()
}
