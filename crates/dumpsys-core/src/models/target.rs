//! Target models - what one invocation works on

use std::collections::BTreeSet;

use super::ServiceName;

/// Registry namespace a target set is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// General service registry
    General,
    /// Hardware service registry
    Hardware,
}

/// Names whose summary line is annotated with `(skipped)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<ServiceName>);

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &ServiceName) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<N: Into<ServiceName>> FromIterator<N> for SkipSet {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The resolved work for one invocation of the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// Dump every general service, in registry order
    AllServices,
    /// Dump every general service; skip-set members are flagged in the summary
    FilteredAll { skip: SkipSet },
    /// Resolve every general service without dumping any
    ListServices { skip: SkipSet },
    /// List every hardware service
    AllHardwareServices,
    /// Dump one named service, forwarding `args` verbatim
    SingleService { name: ServiceName, args: Vec<String> },
}

impl TargetSpec {
    /// Build the bulk dump target, collapsing an empty skip-set
    pub fn all(skip: SkipSet) -> Self {
        if skip.is_empty() {
            TargetSpec::AllServices
        } else {
            TargetSpec::FilteredAll { skip }
        }
    }

    pub fn single(name: impl Into<ServiceName>, args: Vec<String>) -> Self {
        TargetSpec::SingleService {
            name: name.into(),
            args,
        }
    }

    /// Registry this target reads from
    pub fn namespace(&self) -> Namespace {
        match self {
            TargetSpec::AllHardwareServices => Namespace::Hardware,
            _ => Namespace::General,
        }
    }

    /// Skip-set in effect; never set for a single named service
    pub fn skip_set(&self) -> Option<&SkipSet> {
        match self {
            TargetSpec::FilteredAll { skip } | TargetSpec::ListServices { skip } => Some(skip),
            _ => None,
        }
    }
}
