use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tenura_core::MenuId;

/// HTTP methods a role may use against one menu route.
///
/// Parsed from the stored access string, e.g. `"GET,POST"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodAccess(BTreeSet<String>);

impl MethodAccess {
    /// Parses a comma-separated access string. Blank segments are ignored and
    /// method names are upper-cased.
    #[must_use]
    pub fn parse(access: &str) -> Self {
        Self(
            access
                .split(',')
                .map(str::trim)
                .filter(|method| !method.is_empty())
                .map(str::to_ascii_uppercase)
                .collect(),
        )
    }

    /// Returns whether the method is allowed, compared case-insensitively.
    #[must_use]
    pub fn allows(&self, method: &str) -> bool {
        self.0.contains(&method.trim().to_ascii_uppercase())
    }

    /// Returns whether no method is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the canonical access string.
    #[must_use]
    pub fn to_access_string(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Adds every method allowed by `other`.
    pub fn merge(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }
}

/// Effective access of a role or role set.
///
/// Holds the names of active permissions and, for the menu-route model,
/// the allowed methods per menu. An empty map grants nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessMap {
    permissions: BTreeSet<String>,
    menus: BTreeMap<MenuId, MethodAccess>,
}

impl AccessMap {
    /// Creates an empty access map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission name.
    pub fn grant_permission(&mut self, name: impl Into<String>) {
        self.permissions.insert(name.into());
    }

    /// Adds methods for a menu, merging with methods already granted.
    pub fn grant_menu(&mut self, menu_id: MenuId, methods: &MethodAccess) {
        self.menus.entry(menu_id).or_default().merge(methods);
    }

    /// Merges another access map into this one.
    pub fn merge(&mut self, other: &Self) {
        self.permissions.extend(other.permissions.iter().cloned());
        for (menu_id, methods) in &other.menus {
            self.grant_menu(*menu_id, methods);
        }
    }

    /// Builds the union of several access maps.
    #[must_use]
    pub fn union<'a>(maps: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut combined = Self::new();
        for map in maps {
            combined.merge(map);
        }
        combined
    }

    /// Returns whether the map grants nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty() && self.menus.values().all(MethodAccess::is_empty)
    }

    /// Returns whether the named permission is granted.
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    /// Returns whether the method is allowed on the menu route.
    #[must_use]
    pub fn allows_menu_method(&self, menu_id: MenuId, method: &str) -> bool {
        self.menus
            .get(&menu_id)
            .is_some_and(|methods| methods.allows(method))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tenura_core::MenuId;

    use super::{AccessMap, MethodAccess};

    #[test]
    fn access_string_is_normalized() {
        let access = MethodAccess::parse(" get, POST,,delete ");
        assert_eq!(access.to_access_string(), "DELETE,GET,POST");
        assert!(access.allows("post"));
        assert!(!access.allows("PUT"));
    }

    #[test]
    fn blank_access_string_allows_nothing() {
        assert!(MethodAccess::parse(" , ").is_empty());
    }

    #[test]
    fn empty_map_grants_nothing() {
        let map = AccessMap::new();
        assert!(map.is_empty());
        assert!(!map.has_permission("user.read"));
        assert!(!map.allows_menu_method(MenuId::new(), "GET"));
    }

    #[test]
    fn menu_with_blank_methods_counts_as_empty() {
        let mut map = AccessMap::new();
        map.grant_menu(MenuId::new(), &MethodAccess::parse(""));
        assert!(map.is_empty());
    }

    #[test]
    fn merging_menus_unions_methods() {
        let menu_id = MenuId::new();
        let mut first = AccessMap::new();
        first.grant_menu(menu_id, &MethodAccess::parse("GET"));
        let mut second = AccessMap::new();
        second.grant_menu(menu_id, &MethodAccess::parse("POST"));

        let combined = AccessMap::union([&first, &second]);

        assert!(combined.allows_menu_method(menu_id, "GET"));
        assert!(combined.allows_menu_method(menu_id, "POST"));
    }

    fn access_map_strategy() -> impl Strategy<Value = AccessMap> {
        let fixed_menus = [MenuId::new(), MenuId::new(), MenuId::new()];
        (
            prop::collection::vec("[a-z]{1,6}\\.[a-z]{1,6}", 0..6),
            prop::collection::vec(0usize..3, 0..4),
        )
            .prop_map(move |(permissions, menus)| {
                let methods = ["GET", "POST", "DELETE"];
                let mut map = AccessMap::new();
                for permission in permissions {
                    map.grant_permission(permission);
                }
                for index in menus {
                    map.grant_menu(fixed_menus[index], &MethodAccess::parse(methods[index]));
                }
                map
            })
    }

    proptest! {
        #[test]
        fn union_is_order_independent(
            maps in prop::collection::vec(access_map_strategy(), 0..5)
        ) {
            let forward = AccessMap::union(maps.iter());
            let backward = AccessMap::union(maps.iter().rev());
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn union_is_idempotent(map in access_map_strategy()) {
            let doubled = AccessMap::union([&map, &map]);
            prop_assert_eq!(doubled, map);
        }
    }
}
