//! Engine option descriptors for the UCI `option` listing.

/// Option type, default, and range.
#[derive(Clone, Copy, Debug)]
pub enum OptionKind {
    Spin { default: i64, min: i64, max: i64 },
    Check { default: bool },
    Button,
}

#[derive(Clone, Copy, Debug)]
pub struct EngineOption {
    pub name: &'static str,
    pub kind: OptionKind,
}

/// Every configurable option with its default and range.
#[must_use]
pub fn all() -> Vec<EngineOption> {
    use OptionKind::{Button, Check, Spin};
    vec![
        EngineOption {
            name: "Hash",
            kind: Spin {
                default: 512,
                min: 1,
                max: 65536,
            },
        },
        EngineOption {
            name: "ClearHash",
            kind: Button,
        },
        EngineOption {
            name: "Contempt",
            kind: Spin {
                default: 0,
                min: -500,
                max: 500,
            },
        },
        EngineOption {
            name: "DeltaPruning",
            kind: Spin {
                default: 200,
                min: 0,
                max: 1000,
            },
        },
        EngineOption {
            name: "Razoring",
            kind: Spin {
                default: 300,
                min: 0,
                max: 1000,
            },
        },
        EngineOption {
            name: "CheckExtensions",
            kind: Check { default: true },
        },
        EngineOption {
            name: "IID",
            kind: Check { default: true },
        },
        EngineOption {
            name: "LMR",
            kind: Spin {
                default: 1,
                min: 0,
                max: 4,
            },
        },
        EngineOption {
            name: "NullMovePruning",
            kind: Check { default: true },
        },
        EngineOption {
            name: "OneReplyExt",
            kind: Check { default: true },
        },
        EngineOption {
            name: "Tempo",
            kind: Spin {
                default: 10,
                min: 0,
                max: 50,
            },
        },
        EngineOption {
            name: "Test",
            kind: Spin {
                default: 0,
                min: 0,
                max: 100,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_params() {
        let params = crate::params::Params::default();
        for opt in all() {
            match (opt.name, opt.kind) {
                ("Hash", OptionKind::Spin { default, .. }) => {
                    assert_eq!(default as usize, params.hash_mb);
                }
                ("Contempt", OptionKind::Spin { default, .. }) => {
                    assert_eq!(default as i32, params.contempt);
                }
                ("DeltaPruning", OptionKind::Spin { default, .. }) => {
                    assert_eq!(default as i32, params.delta);
                }
                ("Razoring", OptionKind::Spin { default, .. }) => {
                    assert_eq!(default as i32, params.razor);
                }
                ("LMR", OptionKind::Spin { default, .. }) => {
                    assert_eq!(default as i32, params.lmr);
                }
                ("Tempo", OptionKind::Spin { default, .. }) => {
                    assert_eq!(default as i32, params.tempo);
                }
                ("CheckExtensions", OptionKind::Check { default }) => {
                    assert_eq!(default, params.check_ext);
                }
                ("NullMovePruning", OptionKind::Check { default }) => {
                    assert_eq!(default, params.null_move);
                }
                _ => {}
            }
        }
    }
}
