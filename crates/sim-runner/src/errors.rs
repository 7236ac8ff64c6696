//! Top-level error type for the simulator binary.

use thiserror::Error;
use ticksim_core::ProcessorError;

use crate::config::ConfigError;
use crate::parser::ParseError;
use crate::session::SessionError;

/// Any error that ends a simulator run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Startup configuration could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The program text is malformed.
    #[error("cannot load program: {0}")]
    Parse(#[from] ParseError),
    /// The program could not be installed.
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    /// The session ended abnormally.
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use ticksim_core::{ExecFault, FaultCode};

    use super::SimError;
    use crate::config::ConfigError;
    use crate::loader::load_program;
    use crate::session::SessionError;

    #[test]
    fn messages_pass_through() {
        let parse = load_program("???").expect_err("malformed");
        assert_eq!(
            SimError::from(parse).to_string(),
            "cannot load program: line 1: unknown mnemonic `???`: `???`"
        );

        let missing = SimError::from(ConfigError::MissingKey("writer"));
        assert_eq!(
            missing.to_string(),
            "configuration is missing the `writer` entry"
        );

        let fault = SimError::from(SessionError::from(ExecFault {
            pc: 1,
            line: 2,
            code: FaultCode::DivideByZero,
        }));
        assert_eq!(
            fault.to_string(),
            "execution fault at pc 1 (line 2): division by zero"
        );
    }
}
