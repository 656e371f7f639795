use serde::{Deserialize, Serialize};

/// Which block limits the session enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockLimitsMode {
    None,
    GlobalOnly,
    PerFaction,
    PerPlayer,
}

/// Session rules that cap how far a welding tool may grow a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldLimits {
    pub mode: BlockLimitsMode,
    /// Maximum number of blocks in one grid. Zero means unlimited.
    #[serde(default)]
    pub max_grid_size: usize,
}

/// The player a tool is building for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builder {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub ignores_pcu_limit: bool,
}

impl Default for WorldLimits {
    fn default() -> Self {
        Self {
            mode: BlockLimitsMode::None,
            max_grid_size: 0,
        }
    }
}

impl WorldLimits {
    /// Whether `builder` may add `blocks_to_build` blocks to a grid that already holds
    /// `blocks_count`. Admins are bound only by their own PCU-limit override flag.
    pub fn permits(&self, builder: &Builder, blocks_count: usize, blocks_to_build: usize) -> bool {
        if self.mode == BlockLimitsMode::None {
            return true;
        }

        if builder.is_admin {
            return builder.ignores_pcu_limit;
        }

        if self.max_grid_size != 0 && blocks_count + blocks_to_build > self.max_grid_size {
            log::debug!(
                "grid of {} blocks cannot take {} more (max {})",
                blocks_count,
                blocks_to_build,
                self.max_grid_size
            );
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_grid_size: usize) -> WorldLimits {
        WorldLimits {
            mode: BlockLimitsMode::PerPlayer,
            max_grid_size,
        }
    }

    #[test]
    fn test_disabled_limits_permit_everything() {
        let limits = WorldLimits {
            max_grid_size: 1,
            ..WorldLimits::default()
        };
        assert!(limits.permits(&Builder::default(), 100, 100));
    }

    #[test]
    fn test_grid_size_cap() {
        let player = Builder::default();
        assert!(limits(10).permits(&player, 8, 2));
        assert!(!limits(10).permits(&player, 8, 3));
        assert!(limits(0).permits(&player, 1_000_000, 1));
    }

    #[test]
    fn test_admin_override() {
        let admin = Builder {
            is_admin: true,
            ignores_pcu_limit: true,
        };
        assert!(limits(10).permits(&admin, 50, 50));

        let restricted_admin = Builder {
            is_admin: true,
            ignores_pcu_limit: false,
        };
        assert!(!limits(10).permits(&restricted_admin, 0, 1));
    }
}
