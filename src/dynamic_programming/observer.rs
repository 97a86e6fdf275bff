use ndarray::ArrayView1;

/// Snapshot handed to an [`Observer`] once per stage (backward induction) or
/// once per sweep (value iteration).
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Stage index `t` for backward induction, sweep count for value iteration.
    pub step: usize,
    pub values: ArrayView1<'a, f64>,
    pub policy: ArrayView1<'a, usize>,
    /// Sup-norm change of the sweep. Always `None` for backward induction.
    pub delta: Option<f64>,
}

pub trait Observer {
    fn observe(&mut self, progress: &Progress<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&Progress<'_>),
{
    fn observe(&mut self, progress: &Progress<'_>) {
        self(progress)
    }
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Observer for Silent {
    fn observe(&mut self, _progress: &Progress<'_>) {}
}

/// Records the sweep deltas of a value iteration run.
#[derive(Debug, Default, Clone)]
pub struct DeltaHistory {
    pub deltas: Vec<f64>,
}

impl Observer for DeltaHistory {
    fn observe(&mut self, progress: &Progress<'_>) {
        if let Some(d) = progress.delta {
            self.deltas.push(d);
        }
    }
}
