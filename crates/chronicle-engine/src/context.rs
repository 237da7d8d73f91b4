//! Ambient actor attribution.
//!
//! Two scoping mechanisms, both strictly nested:
//!
//! - synchronous scopes ([`with_actor`]) kept on a thread-local stack. The
//!   body is a plain closure, so no other future can be polled on the thread
//!   while the scope is open, and the previous actor is restored on every
//!   exit path including panics;
//! - task-local scopes for async code ([`scope`]), bound to one future for
//!   its lifetime. The binding is only installed while that future is being
//!   polled, so sibling futures (`join!`, `select!`) and other tasks never
//!   observe it.
//!
//! Synchronous scopes have no guard-returning form, so none can be held
//! across an `.await`.
//!
//! Every scope takes a sequence number on entry; [`current_actor`] returns
//! whichever active scope was entered last.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use chronicle_core::models::Actor;

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ACTOR_STACK: RefCell<Vec<(u64, Actor)>> = const { RefCell::new(Vec::new()) };
}

tokio::task_local! {
    static TASK_ACTOR: (u64, Actor);
}

fn next_scope_id() -> u64 {
    NEXT_SCOPE.fetch_add(1, Ordering::Relaxed)
}

/// Pops the synchronous frame it pushed, even on unwind.
struct Frame {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Frame {
    fn push(actor: Actor) -> Self {
        let depth = ACTOR_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.push((next_scope_id(), actor));
            depth
        });
        Self {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        ACTOR_STACK.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Run `body` with `actor` as the innermost ambient actor.
pub fn with_actor<A, F, R>(actor: A, body: F) -> R
where
    A: Into<Actor>,
    F: FnOnce() -> R,
{
    let _frame = Frame::push(actor.into());
    body()
}

/// Run `future` with `actor` bound for as long as it is polled.
pub async fn scope<F>(actor: impl Into<Actor>, future: F) -> F::Output
where
    F: Future,
{
    TASK_ACTOR.scope((next_scope_id(), actor.into()), future).await
}

/// The innermost active actor, if any.
pub fn current_actor() -> Option<Actor> {
    let sync = ACTOR_STACK.with(|stack| stack.borrow().last().cloned());
    let task = TASK_ACTOR.try_with(Clone::clone).ok();
    match (sync, task) {
        (Some((s, sync)), Some((t, task))) => Some(if s > t { sync } else { task }),
        (Some((_, actor)), None) | (None, Some((_, actor))) => Some(actor),
        (None, None) => None,
    }
}

/// Number of synchronous scopes open on this thread.
pub fn sync_depth() -> usize {
    ACTOR_STACK.with(|stack| stack.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::models::EntityRef;

    #[test]
    fn no_scope_means_no_actor() {
        assert_eq!(current_actor(), None);
    }

    #[test]
    fn nested_scopes_restore_outer() {
        with_actor("alice", || {
            assert_eq!(current_actor(), Some(Actor::named("alice")));
            with_actor(EntityRef::new("User", "7"), || {
                assert_eq!(
                    current_actor(),
                    Some(Actor::identified(EntityRef::new("User", "7")))
                );
            });
            assert_eq!(current_actor(), Some(Actor::named("alice")));
        });
        assert_eq!(current_actor(), None);
    }

    #[test]
    fn early_error_return_restores() {
        fn step(ok: bool) -> Result<(), String> {
            if ok {
                Ok(())
            } else {
                Err("boom".to_string())
            }
        }
        fn fails() -> Result<(), String> {
            with_actor("bob", || -> Result<(), String> {
                step(false)?;
                Ok(())
            })
        }
        assert!(fails().is_err());
        assert_eq!(current_actor(), None);
        assert_eq!(sync_depth(), 0);
    }

    #[test]
    fn panic_restores() {
        let result = std::panic::catch_unwind(|| {
            with_actor("carol", || panic!("inside scope"));
        });
        assert!(result.is_err());
        assert_eq!(current_actor(), None);
        assert_eq!(sync_depth(), 0);
    }

    #[test]
    fn scopes_do_not_leak_across_threads() {
        with_actor("main", || {
            let seen = std::thread::spawn(current_actor).join().unwrap();
            assert_eq!(seen, None);
        });
    }

    #[tokio::test]
    async fn task_scope_spans_await_points() {
        let seen = scope("dave", async {
            tokio::task::yield_now().await;
            current_actor()
        })
        .await;
        assert_eq!(seen, Some(Actor::named("dave")));
        assert_eq!(current_actor(), None);
    }

    #[tokio::test]
    async fn sync_scope_inside_task_scope_is_innermost() {
        let seen = scope("outer", async { with_actor("inner", current_actor) }).await;
        assert_eq!(seen, Some(Actor::named("inner")));
    }

    #[test]
    fn task_scope_inside_sync_scope_is_innermost() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let seen = with_actor("outer", || rt.block_on(scope("inner", async { current_actor() })));
        assert_eq!(seen, Some(Actor::named("inner")));
    }

    #[tokio::test]
    async fn sibling_futures_on_one_thread_do_not_share_scopes() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let (scoped, sibling) = tokio::join!(
            scope("alice", async move {
                let _ = rx.await;
                current_actor()
            }),
            async move {
                tokio::task::yield_now().await;
                let seen = current_actor();
                let _ = tx.send(());
                seen
            }
        );
        assert_eq!(scoped, Some(Actor::named("alice")));
        assert_eq!(sibling, None);
    }

    #[tokio::test]
    async fn nested_task_scopes_restore_outer_after_await() {
        let seen = scope("outer", async {
            let inner = scope("inner", async {
                tokio::task::yield_now().await;
                current_actor()
            })
            .await;
            tokio::task::yield_now().await;
            (inner, current_actor())
        })
        .await;
        assert_eq!(seen, (Some(Actor::named("inner")), Some(Actor::named("outer"))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn task_scope_does_not_leak_into_other_tasks() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let scoped = tokio::spawn(scope("erin", async move {
            let _ = rx.await;
            current_actor()
        }));
        let other = tokio::spawn(async { current_actor() }).await.unwrap();
        let _ = tx.send(());

        assert_eq!(other, None);
        assert_eq!(scoped.await.unwrap(), Some(Actor::named("erin")));
    }
}
