// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Process-group setup for local child commands.

use tokio::process::Command;

/// Configure `cmd` so its child becomes the leader of a new process group
/// (Unix) or is otherwise isolated so a later kill can target the whole
/// tree. On platforms without process-group primitives this is a no-op —
/// capability fallback, not a contract change.
pub fn set_process_group(cmd: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Equivalent of Setpgid: true — pgid becomes the child's own pid.
        cmd.process_group(0);
    }
    #[cfg(not(unix))]
    {
        let _ = cmd;
    }
}

/// Whether the platform supports sending a signal to a whole process
/// group. Windows callers must not depend on group-kill semantics.
pub const fn supports_process_group() -> bool {
    cfg!(unix)
}
