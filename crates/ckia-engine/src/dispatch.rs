//! Uniform invocation of registered checks
//!
//! Checks are stored as `Arc<dyn Check<C>>`, so the typed path
//! ([`Dispatcher::invoke`]) cannot get an operation or its arguments wrong.
//! [`Dispatcher::invoke_named`] accepts an operation name and a loose argument
//! list, for callers that select the operation at run time.

use crate::registry::CheckRegistry;
use ckia_core::{CheckDescriptor, CheckId, CheckResult, CkiaError, ExecutionContext, Result};
use std::fmt;

/// Operations every check exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Static metadata; takes no arguments
    Describe,
    /// Run the check; takes an execution context and a provider connection
    Execute,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Describe => "describe",
            Operation::Execute => "execute",
        }
    }

    /// Number of arguments the operation takes
    pub fn arity(&self) -> usize {
        match self {
            Operation::Describe => 0,
            Operation::Execute => 2,
        }
    }

    /// Resolve an operation name for the check `id`
    pub fn resolve(id: &CheckId, name: &str) -> Result<Self> {
        match name {
            "describe" => Ok(Operation::Describe),
            "execute" => Ok(Operation::Execute),
            _ => Err(CkiaError::UnknownOperation {
                id: id.to_string(),
                operation: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single loosely-typed argument for [`Dispatcher::invoke_named`]
pub enum Argument<'a, C: ?Sized> {
    Context(&'a ExecutionContext),
    Connection(&'a C),
}

/// An operation together with its arguments
pub enum Invocation<'a, C: ?Sized> {
    Describe,
    Execute(&'a ExecutionContext, &'a C),
}

impl<'a, C: ?Sized> Invocation<'a, C> {
    /// Bind `args` to `operation`, checking count and shape
    pub fn bind(operation: Operation, args: Vec<Argument<'a, C>>) -> Result<Self> {
        let mismatch = || CkiaError::ArityMismatch {
            operation: operation.name().to_string(),
            expected: operation.arity(),
            got: args.len(),
        };

        match operation {
            Operation::Describe if args.is_empty() => Ok(Invocation::Describe),
            Operation::Execute => match args.as_slice() {
                [Argument::Context(ctx), Argument::Connection(conn)] => {
                    Ok(Invocation::Execute(*ctx, *conn))
                }
                _ => Err(mismatch()),
            },
            Operation::Describe => Err(mismatch()),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Invocation::Describe => Operation::Describe,
            Invocation::Execute(..) => Operation::Execute,
        }
    }
}

/// What a dispatched operation produced
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Descriptor(CheckDescriptor),
    Result(Option<CheckResult>),
}

/// Resolves identifiers through a registry and invokes the check behind them
pub struct Dispatcher<'r, C: ?Sized> {
    registry: &'r CheckRegistry<C>,
}

impl<'r, C: ?Sized> Dispatcher<'r, C> {
    pub fn new(registry: &'r CheckRegistry<C>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r CheckRegistry<C> {
        self.registry
    }

    /// Invoke a typed operation on the check registered under `id`
    pub fn invoke(&self, id: &CheckId, invocation: Invocation<'_, C>) -> Result<Dispatched> {
        match invocation {
            Invocation::Describe => self.describe(id).map(Dispatched::Descriptor),
            Invocation::Execute(ctx, conn) => self.execute(id, ctx, conn).map(Dispatched::Result),
        }
    }

    /// Invoke an operation by name.
    ///
    /// Fails with `UnknownIdentifier`, `UnknownOperation` or `ArityMismatch`,
    /// checked in that order.
    pub fn invoke_named(
        &self,
        id: &CheckId,
        operation: &str,
        args: Vec<Argument<'_, C>>,
    ) -> Result<Dispatched> {
        self.registry.lookup(id)?;
        let operation = Operation::resolve(id, operation)?;
        let invocation = Invocation::bind(operation, args)?;
        self.invoke(id, invocation)
    }

    pub fn describe(&self, id: &CheckId) -> Result<CheckDescriptor> {
        Ok(self.registry.lookup(id)?.describe())
    }

    pub fn execute(&self, id: &CheckId, ctx: &ExecutionContext, conn: &C) -> Result<Option<CheckResult>> {
        self.registry.lookup(id)?.execute(ctx, conn)
    }
}
