//! # Integration Test Flows
//!
//! Tests that the guard chain, command queue, stack controller and
//! persistence manager work together against a real state directory.
//!
//! ## Flows Tested:
//!
//! 1. **Guards → Queue → Controller**: allowed commands reach the controller,
//!    denied ones never do
//! 2. **Controller → Persistence → Store**: published trees are saved and
//!    restored by a fresh coordinator
//! 3. **Logout**: pending commands resolve as cleared and the saved state is gone
//! 4. **Scoping**: app and site state for the same user live under separate keys

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use nav_coordinator::{
        Command, CoordinatorConfig, FileStore, GuardContext, KeyValueStore, NavResult,
        NavigationApi, NavigationController, NavigationCoordinator, NavigationError,
        NavigationMode, Params, RouteSpec, StackController, StateNode, StateTree,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const USER: &str = "u1";

    /// Coordinator over a file store with a controller whose published
    /// trees are fed back into persistence.
    struct Harness {
        coordinator: Arc<NavigationCoordinator<FileStore>>,
        controller: Arc<StackController>,
        store: Arc<FileStore>,
        feed: JoinHandle<()>,
    }

    impl Harness {
        async fn start(dir: &TempDir, mode: NavigationMode) -> Self {
            let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
            let coordinator = Arc::new(NavigationCoordinator::new(
                CoordinatorConfig::for_testing(),
                store.clone(),
            ));
            let initial = coordinator
                .restore(mode, Some(USER))
                .await
                .unwrap_or_else(|| StateTree::single(StateNode::leaf("HomeStack")));
            let controller = Arc::new(StackController::new(initial));
            coordinator.attach_controller(controller.clone());

            let mut changes = controller.subscribe();
            let feed_coordinator = coordinator.clone();
            let feed = tokio::spawn(async move {
                while let Some(tree) = changes.recv().await {
                    feed_coordinator.state_changed(tree, mode, Some(USER));
                }
            });

            Self {
                coordinator,
                controller,
                store,
                feed,
            }
        }

        async fn stop(self) {
            self.feed.abort();
            self.coordinator.shutdown().await;
        }
    }

    fn signed_in() -> GuardContext {
        GuardContext::new(true, false, false, NavigationMode::App)
    }

    fn guest() -> GuardContext {
        GuardContext::new(false, true, false, NavigationMode::App)
    }

    /// Gives the feed task a chance to hand the latest tree to persistence.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    /// Delegating controller that records how many dispatches overlap.
    struct OverlapProbe {
        inner: StackController,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl OverlapProbe {
        fn new() -> Self {
            Self {
                inner: StackController::with_root("HomeStack"),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        async fn enter(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        fn leave(&self) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl NavigationController for OverlapProbe {
        async fn is_ready(&self) -> bool {
            self.inner.is_ready().await
        }

        async fn navigate(&self, route_name: &str, params: Option<&Params>) -> NavResult<()> {
            self.enter().await;
            let result = self.inner.navigate(route_name, params).await;
            self.leave();
            result
        }

        async fn reset(&self, index: usize, routes: &[RouteSpec]) -> NavResult<()> {
            self.enter().await;
            let result = self.inner.reset(index, routes).await;
            self.leave();
            result
        }

        async fn replace(&self, route_name: &str, params: Option<&Params>) -> NavResult<()> {
            self.enter().await;
            let result = self.inner.replace(route_name, params).await;
            self.leave();
            result
        }

        async fn go_back(&self) -> NavResult<()> {
            self.enter().await;
            let result = self.inner.go_back().await;
            self.leave();
            result
        }

        async fn set_params(&self, route_name: &str, params: Params) -> NavResult<()> {
            self.enter().await;
            let result = self.inner.set_params(route_name, params).await;
            self.leave();
            result
        }

        async fn root_state(&self) -> Option<StateTree> {
            self.inner.root_state().await
        }
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    /// Allowed command → controller → broadcast → debounced save → restore.
    #[tokio::test]
    async fn test_navigation_is_restored_after_restart() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::start(&dir, NavigationMode::App).await;

        let done = harness
            .coordinator
            .request(Command::navigate("SettingsScreen", None), &signed_in())
            .await
            .unwrap();
        timeout(Duration::from_secs(1), done).await.unwrap().unwrap();
        assert_eq!(
            harness.controller.current_route().as_deref(),
            Some("SettingsScreen")
        );

        settle().await;
        harness.stop().await;

        let restarted = Harness::start(&dir, NavigationMode::App).await;
        let tree = restarted.controller.snapshot();
        assert_eq!(tree.routes.len(), 2);
        assert_eq!(
            tree.active_leaf().map(|leaf| leaf.name.as_str()),
            Some("SettingsScreen")
        );
        restarted.stop().await;
    }

    #[tokio::test]
    async fn test_denied_command_never_reaches_controller() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::start(&dir, NavigationMode::App).await;

        let err = harness
            .coordinator
            .request(Command::navigate("AdminTab", None), &signed_in())
            .await
            .unwrap_err();
        match err {
            NavigationError::GuardDenied { redirect_to, .. } => {
                assert_eq!(redirect_to.as_deref(), Some("HomeScreen"))
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = harness
            .coordinator
            .request(Command::navigate("EditProfileScreen", None), &guest())
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationError::GuardDenied { .. }));

        assert_eq!(harness.controller.commands_applied(), 0);
        assert_eq!(harness.coordinator.queue().status().queue_length, 0);
        harness.stop().await;
    }

    /// A reset enqueued after a navigate, but before the navigate
    /// dispatches, runs first.
    #[tokio::test]
    async fn test_reset_overtakes_pending_navigate() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::start(&dir, NavigationMode::App).await;
        let queue = harness.coordinator.queue();

        let navigate = queue.enqueue(Command::navigate("BookmarksScreen", None), 0);
        let reset = queue.enqueue(
            Command::reset(0, vec![RouteSpec::new("SettingsScreen")]),
            2,
        );

        timeout(Duration::from_secs(1), reset).await.unwrap().unwrap();
        timeout(Duration::from_secs(1), navigate).await.unwrap().unwrap();

        let names: Vec<String> = harness
            .controller
            .snapshot()
            .routes
            .into_iter()
            .map(|node| node.name)
            .collect();
        assert_eq!(names, vec!["SettingsScreen", "BookmarksScreen"]);
        harness.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submitters_never_overlap() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
        let coordinator = Arc::new(NavigationCoordinator::new(
            CoordinatorConfig::for_testing(),
            store,
        ));
        let probe = Arc::new(OverlapProbe::new());
        coordinator.attach_controller(probe.clone());

        let routes = ["SettingsScreen", "BookmarksScreen", "NotificationsScreen", "ChatListScreen"];
        let mut submitters = Vec::new();
        for i in 0..16 {
            let coordinator = coordinator.clone();
            let route = routes[i % routes.len()];
            submitters.push(tokio::spawn(async move {
                let done = coordinator
                    .request(Command::navigate(route, None), &signed_in())
                    .await?;
                done.await
            }));
        }

        for submitter in submitters {
            timeout(Duration::from_secs(5), submitter)
                .await
                .unwrap()
                .unwrap()
                .unwrap();
        }

        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(probe.inner.commands_applied(), 16);
        let status = coordinator.queue().status();
        assert_eq!(status.queue_length, 0);
        assert!(!status.is_processing);
    }

    #[tokio::test]
    async fn test_unmounted_controller_rejects_until_ready() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::start(&dir, NavigationMode::App).await;

        harness.controller.set_ready(false);
        let done = harness
            .coordinator
            .request(Command::navigate("SettingsScreen", None), &signed_in())
            .await
            .unwrap();
        assert!(matches!(done.await, Err(NavigationError::QueueNotReady)));
        assert_eq!(harness.controller.commands_applied(), 0);

        harness.controller.set_ready(true);
        let done = harness
            .coordinator
            .request(Command::navigate("SettingsScreen", None), &signed_in())
            .await
            .unwrap();
        done.await.unwrap();
        assert_eq!(
            harness.controller.current_route().as_deref(),
            Some("SettingsScreen")
        );
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_end_session_clears_queue_and_saved_state() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::start(&dir, NavigationMode::App).await;

        let done = harness
            .coordinator
            .request(Command::navigate("NotificationsScreen", None), &signed_in())
            .await
            .unwrap();
        done.await.unwrap();
        settle().await;
        harness.coordinator.persistence().flush().await;
        assert!(harness
            .coordinator
            .restore(NavigationMode::App, Some(USER))
            .await
            .is_some());

        let queue = harness.coordinator.queue();
        let pending: Vec<_> = ["SettingsScreen", "BookmarksScreen", "ChatListScreen"]
            .into_iter()
            .map(|route| queue.enqueue(Command::navigate(route, None), 0))
            .collect();
        harness
            .coordinator
            .end_session(NavigationMode::App, Some(USER))
            .await;

        for completion in pending {
            assert!(matches!(completion.await, Err(NavigationError::QueueCleared)));
        }
        assert_eq!(
            harness
                .coordinator
                .restore(NavigationMode::App, Some(USER))
                .await,
            None
        );
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_app_and_site_state_use_separate_keys() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
        let coordinator =
            NavigationCoordinator::new(CoordinatorConfig::for_testing(), store.clone());

        let app = StateTree::new(
            vec![StateNode::leaf("HomeStack"), StateNode::leaf("SettingsScreen")],
            1,
        );
        let site = StateTree::single(StateNode::leaf("LandingSiteScreen"));
        coordinator.state_changed(app.clone(), NavigationMode::App, Some(USER));
        coordinator.state_changed(site.clone(), NavigationMode::Site, Some(USER));
        coordinator.persistence().flush().await;

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["nav_state_app_u1_test", "nav_state_site_u1_test"]);

        assert_eq!(
            coordinator.restore(NavigationMode::App, Some(USER)).await,
            Some(app)
        );
        assert_eq!(
            coordinator.restore(NavigationMode::Site, Some(USER)).await,
            Some(site)
        );
    }

    #[tokio::test]
    async fn test_profile_leaf_is_not_restored() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::start(&dir, NavigationMode::App).await;

        let done = harness
            .coordinator
            .request(Command::navigate("UserProfileScreen", None), &signed_in())
            .await
            .unwrap();
        done.await.unwrap();
        settle().await;
        let store = harness.store.clone();
        harness.stop().await;
        assert_eq!(store.keys().await.unwrap().len(), 1);

        let restarted = Harness::start(&dir, NavigationMode::App).await;
        assert_eq!(
            restarted.controller.current_route().as_deref(),
            Some("HomeStack")
        );
        assert!(restarted.store.keys().await.unwrap().is_empty());
        restarted.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_tree_does_not_overwrite_saved_state() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
        let coordinator =
            NavigationCoordinator::new(CoordinatorConfig::for_testing(), store.clone());

        let valid = StateTree::single(StateNode::leaf("SettingsScreen"));
        coordinator.state_changed(valid.clone(), NavigationMode::App, Some(USER));
        coordinator.persistence().flush().await;

        coordinator.state_changed(
            StateTree::new(vec![StateNode::leaf("SettingsScreen")], 4),
            NavigationMode::App,
            Some(USER),
        );
        coordinator.persistence().flush().await;

        assert_eq!(
            coordinator.restore(NavigationMode::App, Some(USER)).await,
            Some(valid)
        );
    }
}
