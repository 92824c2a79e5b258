use serde::Serialize;

use crate::services::reactions::{Membership, ReactionAction, ReactionStep, apply, plan};

/// The reaction state a client renders for one post: the counters
/// shown next to the buttons plus the viewer's own membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionView {
    pub likes_count: i64,
    pub dislikes_count: i64,
    #[serde(flatten)]
    pub membership: Membership,
}

impl ReactionView {
    pub fn new(likes_count: i64, dislikes_count: i64, membership: Membership) -> Self {
        Self {
            likes_count,
            dislikes_count,
            membership,
        }
    }

    fn apply_step(&mut self, step: ReactionStep) {
        match step {
            ReactionStep::AddLike => self.likes_count += 1,
            ReactionStep::RemoveLike => self.likes_count -= 1,
            ReactionStep::AddDislike => self.dislikes_count += 1,
            ReactionStep::RemoveDislike => self.dislikes_count -= 1,
            ReactionStep::SwitchToLike => {
                self.likes_count += 1;
                self.dislikes_count -= 1;
            }
            ReactionStep::SwitchToDislike => {
                self.dislikes_count += 1;
                self.likes_count -= 1;
            }
        }
        self.membership = apply(step, self.membership);
    }
}

/// Speculatively apply `action` to `view`, then await the matching
/// server call. On failure the view is restored to the exact
/// pre-action snapshot and the error is passed through, so the
/// rendered state is always either the old or the new truth.
///
/// Returns whether anything was applied; a planned no-op sends nothing.
pub async fn optimistic<F, Fut, E>(
    view: &mut ReactionView,
    action: ReactionAction,
    send: F,
) -> Result<bool, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let Some(step) = plan(action, view.membership) else {
        return Ok(false);
    };

    let snapshot = *view;
    view.apply_step(step);

    match send().await {
        Ok(()) => Ok(true),
        Err(err) => {
            *view = snapshot;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_view() -> ReactionView {
        ReactionView::new(10, 2, Membership::default())
    }

    async fn ok() -> Result<(), &'static str> {
        Ok(())
    }

    async fn network_down() -> Result<(), &'static str> {
        Err("NETWORK")
    }

    #[tokio::test]
    async fn successful_like_sticks() {
        let mut view = neutral_view();
        let applied = optimistic(&mut view, ReactionAction::Like, ok).await.unwrap();

        assert!(applied);
        assert_eq!(view.likes_count, 11);
        assert!(view.membership.liked);
    }

    #[tokio::test]
    async fn failed_like_reverts_exactly() {
        let mut view = neutral_view();
        let before = view;

        let result = optimistic(&mut view, ReactionAction::Like, network_down).await;

        assert_eq!(result, Err("NETWORK"));
        assert_eq!(view, before);
        assert_eq!(view.likes_count, 10);
        assert!(!view.membership.liked);
    }

    #[tokio::test]
    async fn failed_switch_reverts_both_counters() {
        let mut view = ReactionView::new(
            5,
            3,
            Membership {
                liked: false,
                disliked: true,
            },
        );
        let before = view;

        let result = optimistic(&mut view, ReactionAction::Like, network_down).await;

        assert_eq!(result, Err("NETWORK"));
        assert_eq!(view, before);
    }

    #[tokio::test]
    async fn noop_action_sends_nothing() {
        let mut view = neutral_view();
        let mut sent = false;
        let applied = optimistic(&mut view, ReactionAction::Unlike, || {
            sent = true;
            ok()
        })
        .await
        .unwrap();

        assert!(!applied);
        assert!(!sent);
        assert_eq!(view, neutral_view());
    }

    #[tokio::test]
    async fn switch_moves_one_count_each_way() {
        let mut view = neutral_view();
        optimistic(&mut view, ReactionAction::Dislike, ok).await.unwrap();
        optimistic(&mut view, ReactionAction::Like, ok).await.unwrap();

        assert_eq!(view.likes_count, 11);
        assert_eq!(view.dislikes_count, 2);
        assert!(view.membership.liked);
        assert!(!view.membership.disliked);
    }
}
