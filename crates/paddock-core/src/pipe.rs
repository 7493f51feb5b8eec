//! # Pipelines
//!
//! Left-to-right composition of same-typed steps.
//!
//! `pipe(vec![f, g, h]).run(x)` computes `h(g(f(x)))`.

/// One boxed transformation step.
pub type Step<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// An ordered sequence of steps.
pub struct Pipeline<T> {
    steps: Vec<Step<T>>,
}

impl<T> Pipeline<T> {
    /// An empty pipeline; `run` returns its input unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step.
    #[must_use]
    pub fn then<F>(mut self, step: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Feed `input` through every step in order.
    pub fn run(&self, input: T) -> T {
        self.steps.iter().fold(input, |acc, step| step(acc))
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Build a pipeline from a list of steps.
#[must_use]
pub fn pipe<T>(steps: Vec<Step<T>>) -> Pipeline<T> {
    Pipeline { steps }
}
