//! Progress reporting for resampling passes.
//!
//! Global operators run a fixed number of passes over the whole mesh. The
//! `*_with_progress` variants accept a [`Progress`] and report once per pass
//! (or per sub-step of a pass) so a front end can draw a bar.
//!
//! # Example
//!
//! ```
//! use meshedit::algo::Progress;
//! use meshedit::algo::subdivide::{upsample_with_progress, SubdivideOptions};
//! use meshedit::mesh::primitives;
//!
//! let mut mesh = primitives::icosahedron(1.0).build().unwrap();
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! upsample_with_progress(&mut mesh, &SubdivideOptions::new(1), &progress).unwrap();
//! ```

/// Callback receiving `(current, total, message)` updates.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report that `current` of `total` steps are done.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress inside step `step` of `steps`.
    ///
    /// `done / of` is mapped onto the slice `[step, step + 1)` and reported
    /// in thousandths of a step.
    #[inline]
    pub fn report_sub(&self, done: usize, of: usize, step: usize, steps: usize, message: &str) {
        if of == 0 || steps == 0 {
            return;
        }
        let fraction = (done.min(of) * 1000) / of;
        (self.callback)(step * 1000 + fraction, steps * 1000, message);
    }

    /// A reporter that drops every update.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
