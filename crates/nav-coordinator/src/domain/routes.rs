//! Known route catalogue
//!
//! Route names the screens layer is known to register, grouped by the stack
//! they live in. The catalogue is advisory: the validator reports unknown
//! names as warnings because screens evolve independently of this crate.

use std::collections::HashMap;

/// Stack holding the top-level routes.
pub const ROOT_STACK: &str = "RootStack";

const ROOT_ROUTES: &[&str] = &[
    "HomeStack",
    "LoginScreen",
    "LandingSiteScreen",
    "WebViewScreen",
    "PostsReelsScreen",
    "BookmarksScreen",
    "UserProfileScreen",
    "FollowersScreen",
    "DiscoverPeopleScreen",
    "SettingsScreen",
    "ChatListScreen",
    "NewChatScreen",
    "ChatDetailScreen",
    "NotificationsScreen",
    "AboutKarmaCommunityScreen",
    "OrgOnboardingScreen",
    "AdminOrgApprovalsScreen",
    "OrgDashboardScreen",
    "EditProfileScreen",
    "InactiveScreen",
];

const BOTTOM_TAB_ROUTES: &[&str] = &[
    "HomeScreen",
    "SearchTab",
    "DonationsTab",
    "ProfileScreen",
    "AdminTab",
];

const HOME_TAB_STACK_ROUTES: &[&str] = &[
    "HomeMain",
    "LandingSiteScreen",
    "ChatListScreen",
    "ChatDetailScreen",
    "NewChatScreen",
    "NotificationsScreen",
    "AboutKarmaCommunityScreen",
    "SettingsScreen",
    "BookmarksScreen",
    "UserProfileScreen",
    "FollowersScreen",
    "DiscoverPeopleScreen",
    "PostsReelsScreen",
    "WebViewScreen",
];

const SEARCH_TAB_STACK_ROUTES: &[&str] = &[
    "SearchScreen",
    "UserProfileScreen",
    "FollowersScreen",
    "DiscoverPeopleScreen",
    "ChatListScreen",
    "ChatDetailScreen",
    "NewChatScreen",
    "NotificationsScreen",
    "AboutKarmaCommunityScreen",
    "SettingsScreen",
];

const PROFILE_TAB_STACK_ROUTES: &[&str] = &[
    "ProfileScreen",
    "SettingsScreen",
    "ChatListScreen",
    "ChatDetailScreen",
    "NewChatScreen",
    "NotificationsScreen",
    "AboutKarmaCommunityScreen",
    "DiscoverPeopleScreen",
    "EditProfileScreen",
];

const DONATIONS_STACK_ROUTES: &[&str] = &[
    "DonationsScreen",
    "MoneyScreen",
    "ItemsScreen",
    "TimeScreen",
    "KnowledgeScreen",
    "TrumpScreen",
    "CategoryScreen",
    "DreamsScreen",
    "FertilityScreen",
    "JobsScreen",
    "MatchmakingScreen",
    "MentalHealthScreen",
    "GoldenAgeScreen",
    "LanguagesScreen",
    "FoodScreen",
    "ClothesScreen",
    "BooksScreen",
    "FurnitureScreen",
    "MedicalScreen",
    "AnimalsScreen",
    "HousingScreen",
    "SupportScreen",
    "EducationScreen",
    "EnvironmentScreen",
    "TechnologyScreen",
    "MusicScreen",
    "GamesScreen",
    "RiddlesScreen",
    "RecipesScreen",
    "PlantsScreen",
    "WasteScreen",
    "ArtScreen",
    "SportsScreen",
    "ChatListScreen",
    "ChatDetailScreen",
    "NewChatScreen",
    "NotificationsScreen",
    "AboutKarmaCommunityScreen",
    "SettingsScreen",
    "DiscoverPeopleScreen",
];

const ADMIN_STACK_ROUTES: &[&str] = &[
    "AdminDashboard",
    "AdminMoney",
    "AdminPeople",
    "AdminReview",
    "AdminTasks",
    "SettingsScreen",
    "ChatListScreen",
    "ChatDetailScreen",
    "NewChatScreen",
    "NotificationsScreen",
    "AboutKarmaCommunityScreen",
];

/// Which stack the children of a route belong to.
const NESTED_STACKS: &[(&str, &str)] = &[
    ("HomeStack", "HomeTabStack"),
    ("HomeScreen", "HomeTabStack"),
    ("SearchTab", "SearchTabStack"),
    ("ProfileScreen", "ProfileTabStack"),
    ("DonationsTab", "DonationsStack"),
    ("AdminTab", "AdminStack"),
    ("BottomTab", "BottomTab"),
];

/// Route names per stack plus the parent-route to child-stack mapping.
#[derive(Clone, Debug, Default)]
pub struct RouteCatalogue {
    stacks: HashMap<String, Vec<String>>,
    nested: HashMap<String, String>,
}

impl RouteCatalogue {
    /// Catalogue that knows no routes; validating against it never warns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalogue of the routes registered by the app's navigators.
    pub fn standard() -> Self {
        let stacks: [(&str, &[&str]); 7] = [
            (ROOT_STACK, ROOT_ROUTES),
            ("BottomTab", BOTTOM_TAB_ROUTES),
            ("HomeTabStack", HOME_TAB_STACK_ROUTES),
            ("SearchTabStack", SEARCH_TAB_STACK_ROUTES),
            ("ProfileTabStack", PROFILE_TAB_STACK_ROUTES),
            ("DonationsStack", DONATIONS_STACK_ROUTES),
            ("AdminStack", ADMIN_STACK_ROUTES),
        ];

        let mut catalogue = Self::empty();
        for (stack, routes) in stacks {
            catalogue = catalogue.with_stack(stack, routes.iter().copied());
        }
        for (parent, child) in NESTED_STACKS {
            catalogue = catalogue.with_nested_stack(*parent, *child);
        }
        catalogue
    }

    /// Registers (or replaces) the route names of a stack.
    pub fn with_stack<I, S>(mut self, stack: &str, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stacks
            .insert(stack.to_string(), routes.into_iter().map(Into::into).collect());
        self
    }

    /// Declares that the nested state of `parent_route` belongs to `stack`.
    pub fn with_nested_stack(mut self, parent_route: &str, stack: &str) -> Self {
        self.nested
            .insert(parent_route.to_string(), stack.to_string());
        self
    }

    /// Route names registered for a stack (empty if the stack is unknown).
    pub fn valid_route_names(&self, stack: &str) -> &[String] {
        self.stacks.get(stack).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_valid_route_name(&self, route: &str, stack: &str) -> bool {
        self.valid_route_names(stack).iter().any(|r| r == route)
    }

    /// `Some(false)` only when the stack has a catalogue and the route is
    /// missing from it. Unknown stacks yield `None` (nothing to check).
    pub fn check(&self, route: &str, stack: &str) -> Option<bool> {
        let names = self.valid_route_names(stack);
        if names.is_empty() {
            return None;
        }
        Some(names.iter().any(|r| r == route))
    }

    /// Stack the children of `route` belong to. Routes without a mapping
    /// keep their parent's stack.
    pub fn child_stack<'a>(&'a self, route: &str, parent_stack: &'a str) -> &'a str {
        self.nested
            .get(route)
            .map(String::as_str)
            .unwrap_or(parent_stack)
    }
}
