//! Chunked array reads.
//!
//! This example demonstrates:
//! - Draining a capped source with `BulkArrayReader`
//! - Implementing `ArraySource` for a computed array
//! - Summarizing an array argument through the host

use std::borrow::Cow;

use pvrpc::array::{ArraySource, BulkArrayReader, ChunkedSlice};
use pvrpc::host::ServiceHost;
use pvrpc::service::{SummaryService, SummaryServiceFactory};
use pvrpc::structure::PvStructure;
use tracing_subscriber::EnvFilter;

/// Square numbers, at most 5 per read.
struct Squares {
    count: usize,
}

impl ArraySource for Squares {
    type Element = i64;

    fn len(&self) -> usize {
        self.count
    }

    fn read_chunk(&self, offset: usize, max_count: usize) -> Cow<'_, [i64]> {
        let end = (offset + max_count.min(5)).min(self.count);
        Cow::Owned((offset..end).map(|i| (i * i) as i64).collect())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let names: Vec<String> = (0..7).map(|i| format!("SR:BPM{:02}", i)).collect();
    let copied = BulkArrayReader::read_strings(&ChunkedSlice::new(&names, 3))?;
    println!("names: {:?}", copied);

    let squares = BulkArrayReader::read_longs(&Squares { count: 12 })?;
    println!("squares: {:?}", squares);

    let host = ServiceHost::builder()
        .service(SummaryService::NAME, SummaryServiceFactory::create)
        .array_chunk_limit(4)
        .build();
    let channel = host.open_channel(SummaryService::NAME, "stats").await?;

    let values: Vec<f64> = squares.iter().map(|&v| v as f64).collect();
    let argument = PvStructure::new().with_field(SummaryService::VALUES_FIELD, values)?;
    let reply = channel.call(argument).await?.into_reply()?;
    println!(
        "count={} mean={} max={}",
        reply.get_long("count")?,
        reply.get_double("mean")?,
        reply.get_double("max")?
    );

    channel.close().await?;
    Ok(())
}
