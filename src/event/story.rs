// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Story- and scenario-level payloads.

use std::time::Duration;

use linked_hash_map::LinkedHashMap;

/// Top-level BDD execution unit.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Story {
    /// Name of this [`Story`].
    pub name: String,

    /// Path this [`Story`] was loaded from.
    pub path: String,

    /// [`Meta`] declared on this [`Story`].
    pub meta: Meta,
}

impl Story {
    /// Creates a new [`Story`] without any [`Meta`].
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta: Meta::default(),
        }
    }
}

/// Named sequence of steps within a [`Story`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Scenario {
    /// Title of this [`Scenario`].
    pub title: String,

    /// [`Meta`] declared on this [`Scenario`].
    pub meta: Meta,
}

/// Ordered meta properties of a [`Story`] or a [`Scenario`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Meta(LinkedHashMap<String, String>);

impl Meta {
    /// Creates an empty [`Meta`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given property, replacing the previous value, if any.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        drop(self.0.insert(name.into(), value.into()));
        self
    }

    /// Returns the value of the property with the given `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterates over the properties in their declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Indicates whether there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Narrative of a [`Story`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Narrative {
    /// Benefit the [`Story`] brings.
    pub in_order_to: String,

    /// Role interested in the [`Story`].
    pub as_a: String,

    /// Feature the [`Story`] describes.
    pub i_want_to: String,
}

/// Steps run before and after every [`Scenario`] of a [`Story`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Lifecycle {
    /// Steps run before every [`Scenario`].
    pub before_steps: Vec<String>,

    /// Steps run after every [`Scenario`].
    pub after_steps: Vec<String>,
}

/// Stories run before a [`Story`] or a [`Scenario`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GivenStories {
    /// Declared given stories.
    Declared(Vec<GivenStory>),

    /// Resolved paths of the given stories.
    Paths(Vec<String>),
}

impl GivenStories {
    /// Returns the paths of all the given stories.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Declared(stories) => {
                stories.iter().map(|s| s.path.as_str()).collect()
            }
            Self::Paths(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Single declared given story.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GivenStory {
    /// Path of the given story.
    pub path: String,

    /// Anchor selecting a row of the parameters table, if any.
    pub anchor: Option<String>,
}

/// Timing of a cancelled [`Story`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoryDuration {
    /// Time the [`Story`] was running before cancellation.
    pub elapsed: Duration,

    /// Timeout the [`Story`] exceeded.
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_keeps_declaration_order() {
        let meta = Meta::new().with("author", "qa").with("priority", "1");

        assert_eq!(meta.property("priority"), Some("1"));
        assert_eq!(meta.property("missing"), None);
        assert_eq!(
            meta.iter().collect::<Vec<_>>(),
            [("author", "qa"), ("priority", "1")],
        );
    }

    #[test]
    fn given_stories_paths() {
        let declared = GivenStories::Declared(vec![GivenStory {
            path: "a.story".into(),
            anchor: Some("#1".into()),
        }]);
        assert_eq!(declared.paths(), ["a.story"]);

        let paths = GivenStories::Paths(vec!["b.story".into()]);
        assert_eq!(paths.paths(), ["b.story"]);
    }
}
