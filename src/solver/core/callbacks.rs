// ---------------------------------
// enum for managing callbacks
// ---------------------------------

pub(crate) type CallbackFcn<I> = Box<dyn FnMut(&I) -> bool + Send>;

#[derive(Default)]
pub(crate) enum Callback<I> {
    #[default]
    None,
    Rust(CallbackFcn<I>),
}

impl<I> Callback<I> {
    // Call the callback function
    fn call(&mut self, info: &I) -> bool {
        match self {
            Callback::None => false,
            Callback::Rust(f) => f(info),
        }
    }
}

impl<I> std::fmt::Debug for Callback<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::None => write!(f, "None"),
            Callback::Rust(_) => write!(f, "Rust(<closure>)"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct SolverCallbacks<I> {
    /// callback for termination
    pub termination_callback: Callback<I>,
}

impl<I> Default for SolverCallbacks<I> {
    // Create a new set of callbacks
    fn default() -> Self {
        Self {
            termination_callback: Callback::None,
        }
    }
}

impl<I> SolverCallbacks<I> {
    /// true if the user asked to stop.  Never true without a callback.
    pub(crate) fn check_termination(&mut self, info: &I) -> bool {
        self.termination_callback.call(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_call() {
        let mut callbacks = SolverCallbacks::<u32>::default();
        assert!(!callbacks.check_termination(&5));

        let mut calls = 0;
        callbacks.termination_callback = Callback::Rust(Box::new(move |&i| {
            calls += 1;
            i > 2 && calls > 1
        }));
        assert!(!callbacks.check_termination(&3));
        assert!(callbacks.check_termination(&3));
        assert!(!callbacks.check_termination(&1));
        assert_eq!(format!("{:?}", callbacks.termination_callback), "Rust(<closure>)");
    }
}
