use serde::{Deserialize, Serialize};

/// Whether a user id is currently in a post's likes / dislikes sets.
/// Invariant: never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Membership {
    pub liked: bool,
    pub disliked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionAction {
    Like,
    Unlike,
    Dislike,
    Undislike,
}

/// One database statement's worth of state change. The switch variants
/// touch both sets in a single atomic statement so the invariant cannot
/// be observed broken between two writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionStep {
    AddLike,
    RemoveLike,
    AddDislike,
    RemoveDislike,
    SwitchToLike,
    SwitchToDislike,
}

/// Plan the transition for an action against the current membership.
/// `None` means the action is a no-op (already in the requested state),
/// which makes repeated applications idempotent.
pub fn plan(action: ReactionAction, current: Membership) -> Option<ReactionStep> {
    match action {
        ReactionAction::Like => {
            if current.liked {
                None
            } else if current.disliked {
                Some(ReactionStep::SwitchToLike)
            } else {
                Some(ReactionStep::AddLike)
            }
        }
        ReactionAction::Unlike => current.liked.then_some(ReactionStep::RemoveLike),
        ReactionAction::Dislike => {
            if current.disliked {
                None
            } else if current.liked {
                Some(ReactionStep::SwitchToDislike)
            } else {
                Some(ReactionStep::AddDislike)
            }
        }
        ReactionAction::Undislike => current.disliked.then_some(ReactionStep::RemoveDislike),
    }
}

/// Membership after a planned step commits.
pub fn apply(step: ReactionStep, current: Membership) -> Membership {
    match step {
        ReactionStep::AddLike | ReactionStep::SwitchToLike => Membership {
            liked: true,
            disliked: false,
        },
        ReactionStep::AddDislike | ReactionStep::SwitchToDislike => Membership {
            liked: false,
            disliked: true,
        },
        ReactionStep::RemoveLike => Membership {
            liked: false,
            ..current
        },
        ReactionStep::RemoveDislike => Membership {
            disliked: false,
            ..current
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReactionAction::*;

    fn run(actions: &[ReactionAction]) -> Membership {
        let mut state = Membership::default();
        for &action in actions {
            if let Some(step) = plan(action, state) {
                state = apply(step, state);
            }
        }
        state
    }

    #[test]
    fn like_from_neutral() {
        let state = run(&[Like]);
        assert_eq!(
            state,
            Membership {
                liked: true,
                disliked: false
            }
        );
    }

    #[test]
    fn like_is_idempotent() {
        assert_eq!(run(&[Like]), run(&[Like, Like]));
        // second like plans nothing at all
        let liked = run(&[Like]);
        assert_eq!(plan(Like, liked), None);
    }

    #[test]
    fn like_then_unlike_restores_neutral() {
        assert_eq!(run(&[Like, Unlike]), Membership::default());
    }

    #[test]
    fn dislike_while_liked_is_one_switch() {
        let liked = run(&[Like]);
        assert_eq!(plan(Dislike, liked), Some(ReactionStep::SwitchToDislike));
        assert_eq!(
            apply(ReactionStep::SwitchToDislike, liked),
            Membership {
                liked: false,
                disliked: true
            }
        );
    }

    #[test]
    fn like_while_disliked_is_one_switch() {
        let disliked = run(&[Dislike]);
        assert_eq!(plan(Like, disliked), Some(ReactionStep::SwitchToLike));
    }

    #[test]
    fn unlike_and_undislike_on_neutral_are_noops() {
        assert_eq!(plan(Unlike, Membership::default()), None);
        assert_eq!(plan(Undislike, Membership::default()), None);
    }

    #[test]
    fn never_in_both_sets() {
        // every action sequence of length 4 over the alphabet
        let alphabet = [Like, Unlike, Dislike, Undislike];
        for &a in &alphabet {
            for &b in &alphabet {
                for &c in &alphabet {
                    for &d in &alphabet {
                        let state = run(&[a, b, c, d]);
                        assert!(
                            !(state.liked && state.disliked),
                            "both sets after {:?}",
                            [a, b, c, d]
                        );
                    }
                }
            }
        }
    }
}
