//! Array summary service.
//!
//! Reads a `double[]` argument named `values` and replies with its count,
//! sum, mean, min and max. The array is copied out of the argument with the
//! channel's chunk limit.

use crate::array::ElementKind;
use crate::error::{PvRpcError, Result};
use crate::handler::{ChannelContext, RpcRequestHandler, RpcServer, RpcService};
use crate::structure::{FieldDesc, PvStructure};

/// Summarizes an array of doubles.
#[derive(Debug, Default)]
pub struct SummaryService;

impl SummaryService {
    pub const NAME: &'static str = "summary";
    pub const VALUES_FIELD: &'static str = "values";
}

impl RpcService for SummaryService {
    fn argument_fields(&self) -> Vec<FieldDesc> {
        vec![FieldDesc::array(Self::VALUES_FIELD, ElementKind::Double)]
    }

    fn reply_fields(&self) -> Vec<FieldDesc> {
        vec![
            FieldDesc::scalar("count", ElementKind::Long),
            FieldDesc::scalar("sum", ElementKind::Double),
            FieldDesc::scalar("mean", ElementKind::Double),
            FieldDesc::scalar("min", ElementKind::Double),
            FieldDesc::scalar("max", ElementKind::Double),
        ]
    }

    fn compute(
        &mut self,
        ctx: &ChannelContext,
        argument: &PvStructure,
        reply: &mut PvStructure,
    ) -> Result<()> {
        let values: Vec<f64> = argument.copy_array(Self::VALUES_FIELD, ctx.array_chunk_limit())?;
        if values.is_empty() {
            return Err(PvRpcError::Compute("values is empty".to_string()));
        }

        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        reply.set_field("count", values.len() as i64)?;
        reply.set_field("sum", sum)?;
        reply.set_field("mean", sum / values.len() as f64)?;
        reply.set_field("min", min)?;
        reply.set_field("max", max)?;
        Ok(())
    }
}

/// Factory for summary handlers.
pub struct SummaryServiceFactory;

impl SummaryServiceFactory {
    pub fn create() -> Box<dyn RpcServer> {
        Box::new(RpcRequestHandler::new(SummaryService))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(argument: &PvStructure, chunk_limit: usize) -> Result<PvStructure> {
        let mut service = SummaryService;
        let ctx = ChannelContext::new(1, "summary").with_array_chunk_limit(chunk_limit);
        let mut reply = PvStructure::create(&service.reply_fields())?;
        service.compute(&ctx, argument, &mut reply)?;
        Ok(reply)
    }

    #[test]
    fn test_summary() {
        let argument = PvStructure::new()
            .with_field("values", vec![4.0, -2.0, 10.0, 0.0])
            .unwrap();

        for chunk_limit in [1, 3, 4096] {
            let reply = run(&argument, chunk_limit).unwrap();
            assert_eq!(reply.get_long("count").unwrap(), 4);
            assert_eq!(reply.get_double("sum").unwrap(), 12.0);
            assert_eq!(reply.get_double("mean").unwrap(), 3.0);
            assert_eq!(reply.get_double("min").unwrap(), -2.0);
            assert_eq!(reply.get_double("max").unwrap(), 10.0);
        }
    }

    #[test]
    fn test_empty_values_fails() {
        let argument = PvStructure::new()
            .with_field("values", Vec::<f64>::new())
            .unwrap();

        assert!(matches!(run(&argument, 8), Err(PvRpcError::Compute(_))));
    }
}
