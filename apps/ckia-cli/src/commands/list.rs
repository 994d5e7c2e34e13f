//! List registered checks

use anyhow::bail;
use ckia_engine::{write_report, Dispatched, Dispatcher, ResultAggregator};
use clap::Args;

#[derive(Args)]
pub struct ListArgs {
    /// Print only the check identifiers, one per line
    #[arg(long)]
    ids_only: bool,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let registry = ckia_aws::build_registry()?;
    let ids = registry.list_ids();

    if args.ids_only {
        for id in &ids {
            println!("{}", id);
        }
        return Ok(());
    }

    let dispatcher = Dispatcher::new(&registry);
    let mut descriptors = Vec::with_capacity(ids.len());
    for id in &ids {
        match dispatcher.invoke_named(id, "describe", vec![])? {
            Dispatched::Descriptor(descriptor) => descriptors.push(descriptor),
            Dispatched::Result(_) => bail!("describe on {} returned a check result", id),
        }
    }

    let aggregate = ResultAggregator::new().aggregate_descriptors(descriptors);
    write_report(&aggregate.report, None)?;
    Ok(())
}
