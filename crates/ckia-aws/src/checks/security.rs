//! Security checks

use crate::connection::*;
use ckia_core::{Check, CheckDescriptor, CheckResult, ExecutionContext, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootAccountMissingMfa {
    pub account_id: String,
    /// Only resolvable from the organization management account
    pub account_name: String,
}

pub struct RootAccountMissingMfaCheck;

impl RootAccountMissingMfaCheck {
    pub const ID: &'static str = "ckia:aws:security:RootAccountMissingMFA";
}

impl Check<Connection> for RootAccountMissingMfaCheck {
    fn describe(&self) -> CheckDescriptor {
        static DESCRIPTOR: OnceLock<CheckDescriptor> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                CheckDescriptor::new(Self::ID, "MFA on Root Account")
                    .with_description(
                        "Checks the root account and warns if multi-factor authentication (MFA) is not enabled. For \
                         increased security, we recommend that you protect your account by using MFA, which requires \
                         a user to enter a unique authentication code from their MFA hardware or virtual device when \
                         interacting with the AWS Management Console and associated websites.",
                    )
                    .with_criteria("MFA is not enabled on the root account.")
                    .with_recommended_action("Log in to your root account and activate an MFA device.")
                    .with_additional_resources(
                        "Using Multi-Factor Authentication (MFA) Devices with AWS: \
                         https://docs.aws.amazon.com/IAM/latest/UserGuide/Using_ManagingMFA.html",
                    )
            })
            .clone()
    }

    fn execute(&self, ctx: &ExecutionContext, conn: &Connection) -> Result<Option<CheckResult>> {
        let summary = conn.get_account_summary(ctx)?;
        let identity = conn.get_caller_identity(ctx)?;

        let missing: Vec<_> = expand_root_account_missing_mfa(&summary, &identity.account)
            .into_iter()
            .collect();

        CheckResult::new(self.describe())
            .with_field("accountId", &identity.account)?
            .with_findings("rootAccountsMissingMFA", &missing)
            .map(Some)
    }
}

/// Finding when the account summary does not report MFA on the root user
pub fn expand_root_account_missing_mfa(
    summary: &BTreeMap<String, i32>,
    account_id: &str,
) -> Option<RootAccountMissingMfa> {
    if summary.get("AccountMFAEnabled").copied() == Some(1) {
        return None;
    }
    Some(RootAccountMissingMfa {
        account_id: account_id.to_string(),
        account_name: String::new(),
    })
}
