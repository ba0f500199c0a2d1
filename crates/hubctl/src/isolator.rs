//! Port isolation
//!
//! Enables exactly one downstream port and disables every other one. Each run
//! writes every port unconditionally, in ascending order, without reading the
//! current state first.

use crate::session::HubSession;
use protocol::{DeviceSession, HubError, PortCommand, PortFailure, PortIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do when a single port write fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep writing the remaining ports and report every failure at the end
    #[default]
    Continue,
    /// Stop at the first failed write
    Abort,
}

/// Commands issued by a successful isolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationReport {
    pub target: PortIndex,
    pub commands: Vec<PortCommand>,
}

impl IsolationReport {
    pub fn disabled_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| cmd.port != self.target)
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PortIsolator {
    port_count: u8,
    policy: FailurePolicy,
}

impl PortIsolator {
    pub fn new(port_count: u8, policy: FailurePolicy) -> Self {
        Self { port_count, policy }
    }

    pub fn port_count(&self) -> u8 {
        self.port_count
    }

    /// Reject targets outside `[0, port_count)`
    pub fn check_target(&self, target: PortIndex) -> Result<(), HubError> {
        if target.is_within(self.port_count) {
            Ok(())
        } else {
            Err(HubError::InvalidPortIndex {
                index: target.get(),
                port_count: self.port_count,
            })
        }
    }

    /// Writes that isolate `target`, in issue order
    pub fn plan(&self, target: PortIndex) -> Result<Vec<PortCommand>, HubError> {
        self.check_target(target)?;

        Ok((0..self.port_count)
            .map(PortIndex)
            .map(|port| {
                if port == target {
                    PortCommand::enable(port)
                } else {
                    PortCommand::disable(port)
                }
            })
            .collect())
    }

    /// Enable `target` and disable every other port
    ///
    /// An out-of-range target fails before anything is written.
    pub fn isolate<D: DeviceSession>(
        &self,
        session: &mut HubSession<D>,
        target: PortIndex,
    ) -> Result<IsolationReport, HubError> {
        let commands = self.plan(target)?;
        info!("Disabling all ports except port number {}", target);

        let mut issued = Vec::with_capacity(commands.len());
        let mut failures = Vec::new();

        for command in commands {
            issued.push(command);
            match session.apply(command) {
                Ok(()) => debug!("Port {} {}", command.port, command.state),
                Err(error) => {
                    warn!(
                        "Failed to set port {} {}: {}",
                        command.port, command.state, error
                    );
                    failures.push(PortFailure {
                        port: command.port,
                        state: command.state,
                        error,
                    });
                    if self.policy == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(HubError::PortCommandsFailed {
                target,
                issued: issued.len(),
                failures,
            });
        }

        session.mark_isolated();
        Ok(IsolationReport {
            target,
            commands: issued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::PortState;

    #[test]
    fn test_plan_enables_only_target() {
        let plan = PortIsolator::new(4, FailurePolicy::Continue)
            .plan(PortIndex(2))
            .unwrap();
        let states: Vec<PortState> = plan.iter().map(|cmd| cmd.state).collect();
        assert_eq!(
            states,
            vec![
                PortState::Disabled,
                PortState::Disabled,
                PortState::Enabled,
                PortState::Disabled
            ]
        );
    }

    #[test]
    fn test_plan_rejects_out_of_range() {
        let isolator = PortIsolator::new(8, FailurePolicy::Continue);
        assert!(matches!(
            isolator.plan(PortIndex(8)),
            Err(HubError::InvalidPortIndex {
                index: 8,
                port_count: 8
            })
        ));
    }

    #[test]
    fn test_disabled_count() {
        let isolator = PortIsolator::new(8, FailurePolicy::Continue);
        let report = IsolationReport {
            target: PortIndex(0),
            commands: isolator.plan(PortIndex(0)).unwrap(),
        };
        assert_eq!(report.disabled_count(), 7);
    }

    #[test]
    fn test_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: FailurePolicy,
        }
        let parsed: Wrapper = toml::from_str(r#"policy = "abort""#).unwrap();
        assert_eq!(parsed.policy, FailurePolicy::Abort);
    }
}
