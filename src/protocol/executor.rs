use crate::core::Result;

/// Runs a broadcast payload on this node and produces its contribution.
///
/// Implementations own their command vocabulary. `run` must return within a
/// bounded time; a blocked executor stalls the whole node. An `Err` is not a
/// protocol fault: its description becomes this node's contribution.
pub trait LocalExecutor: Send {
    fn run(&mut self, payload: &str) -> Result<String>;
}

impl<F> LocalExecutor for F
where
    F: FnMut(&str) -> Result<String> + Send,
{
    fn run(&mut self, payload: &str) -> Result<String> {
        self(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    #[test]
    fn test_closure_executor() {
        let mut calls = 0;
        let mut executor = |payload: &str| {
            calls += 1;
            if payload == "FAIL" {
                Err(Error::executor("sensor timeout"))
            } else {
                Ok(format!("ran {}", payload))
            }
        };

        assert_eq!(executor.run("STATUS").unwrap(), "ran STATUS");
        assert!(executor.run("FAIL").is_err());
        drop(executor);
        assert_eq!(calls, 2);
    }
}
