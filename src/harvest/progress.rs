/// A trait for reporting progress while a collection is being harvested.
pub trait Progress: Send + Sync {
    /// Set the phase label for the current operation (e.g., "Commits", "Issues").
    fn set_phase(&self, phase: &str);

    /// Set the total number of elements in the collection being harvested.
    fn set_length(&self, total: u64);

    /// Move the indicator to `position`, a value in `[0, total]`.
    fn set_position(&self, position: u64);

    /// Print a message line without disrupting the progress indicator.
    fn println(&self, msg: &str);

    /// Finish and clear the progress indicator.
    fn done(&self);
}
