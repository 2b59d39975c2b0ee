// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Typed feature-flag lookup against a job's variable map.
//!
//! Each recognized `FF_*` variable has a single typed default, resolved once
//! per job rather than as ad-hoc `vars.get("FF_...")` calls scattered
//! through the driver.

use std::collections::HashMap;

/// One recognized `FF_*` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    NetworkPerBuild,
    UseLegacyKubernetesExecutionStrategy,
    SkipNoopBuildStages,
    CmdDisableDelayedErrorLevelExpansion,
    UseLegacyBuildsDirForDocker,
    UseLegacyVolumesMountingOrder,
    ShellExecutorUseLegacyProcessKill,
}

impl Flag {
    pub const ALL: &'static [Flag] = &[
        Flag::NetworkPerBuild,
        Flag::UseLegacyKubernetesExecutionStrategy,
        Flag::SkipNoopBuildStages,
        Flag::CmdDisableDelayedErrorLevelExpansion,
        Flag::UseLegacyBuildsDirForDocker,
        Flag::UseLegacyVolumesMountingOrder,
        Flag::ShellExecutorUseLegacyProcessKill,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Flag::NetworkPerBuild => "FF_NETWORK_PER_BUILD",
            Flag::UseLegacyKubernetesExecutionStrategy => {
                "FF_USE_LEGACY_KUBERNETES_EXECUTION_STRATEGY"
            }
            Flag::SkipNoopBuildStages => "FF_SKIP_NOOP_BUILD_STAGES",
            Flag::CmdDisableDelayedErrorLevelExpansion => {
                "FF_CMD_DISABLE_DELAYED_ERROR_LEVEL_EXPANSION"
            }
            Flag::UseLegacyBuildsDirForDocker => "FF_USE_LEGACY_BUILDS_DIR_FOR_DOCKER",
            Flag::UseLegacyVolumesMountingOrder => "FF_USE_LEGACY_VOLUMES_MOUNTING_ORDER",
            Flag::ShellExecutorUseLegacyProcessKill => {
                "FF_SHELL_EXECUTOR_USE_LEGACY_PROCESS_KILL"
            }
        }
    }

    /// Default value when the job's variable map doesn't mention the flag.
    pub fn default_value(self) -> bool {
        match self {
            Flag::NetworkPerBuild => false,
            Flag::UseLegacyKubernetesExecutionStrategy => true,
            Flag::SkipNoopBuildStages => true,
            Flag::CmdDisableDelayedErrorLevelExpansion => false,
            Flag::UseLegacyBuildsDirForDocker => false,
            Flag::UseLegacyVolumesMountingOrder => false,
            Flag::ShellExecutorUseLegacyProcessKill => false,
        }
    }
}

/// Resolves `FF_*` flags against a job's variable map, falling back to
/// each flag's documented default. Unknown `FF_*` variable names are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    overrides: HashMap<&'static str, bool>,
}

impl FeatureFlags {
    pub fn resolve(variables: &HashMap<String, String>) -> Self {
        let mut overrides = HashMap::new();
        for flag in Flag::ALL {
            if let Some(raw) = variables.get(flag.name()) {
                if let Ok(on) = raw.parse::<bool>() {
                    overrides.insert(flag.name(), on);
                }
            }
        }
        Self { overrides }
    }

    pub fn is_on(&self, flag: Flag) -> bool {
        self.overrides
            .get(flag.name())
            .copied()
            .unwrap_or_else(|| flag.default_value())
    }
}
