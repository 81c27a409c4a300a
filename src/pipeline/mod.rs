pub mod invocation;
pub mod step_outputs;

pub use invocation::{build_invocation, PipelineInvocation};
pub use step_outputs::{
    check_step_contract, StepArtifactSet, StepContractDrift, STEP_OUTPUTS_MANIFEST,
    STEP_OUTPUTS_VERSION,
};
