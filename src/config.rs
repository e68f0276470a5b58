//! Checker configuration.
//!
//! Chooses which standard headers' built-ins are seeded into the global
//! scope and how many diagnostics are kept before the rest are dropped.

use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref HEADER_LOOKUP: HashMap<&'static str, Header> = {
        let mut map = HashMap::new();
        map.insert("iostream", Header::Iostream);
        map.insert("cstdlib", Header::Cstdlib);
        map.insert("stdlib.h", Header::Cstdlib);
        map.insert("cstring", Header::Cstring);
        map.insert("string.h", Header::Cstring);
        map.insert("cmath", Header::Cmath);
        map.insert("math.h", Header::Cmath);
        map
    };
}

/// Standard headers whose declarations can be pre-seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Header {
    Iostream,
    Cstdlib,
    Cstring,
    Cmath,
}

impl Header {
    pub const ALL: [Header; 4] = [Header::Iostream, Header::Cstdlib, Header::Cstring, Header::Cmath];

    /// Looks a header up by the name written in `#include <...>`.
    pub fn from_name(name: &str) -> Option<Header> {
        let name = name.trim_start_matches('<').trim_end_matches('>');
        HEADER_LOOKUP.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub headers: BTreeSet<Header>,
    /// Diagnostics beyond this many are dropped. `None` keeps all of them.
    pub max_diagnostics: Option<usize>,
}

impl Config {
    /// No headers: only the language's own built-ins.
    pub fn bare() -> Self {
        Config {
            headers: BTreeSet::new(),
            max_diagnostics: None,
        }
    }

    /// Configuration for a unit with the given `#include` names.
    ///
    /// Unknown header names are ignored.
    pub fn from_includes<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut config = Config::bare();
        for name in names {
            match Header::from_name(name) {
                Some(header) => {
                    config.headers.insert(header);
                }
                None => log::debug!("ignoring unknown header {:?}", name),
            }
        }
        config
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.insert(header);
        self
    }

    pub fn with_max_diagnostics(mut self, limit: usize) -> Self {
        self.max_diagnostics = Some(limit);
        self
    }

    pub fn includes(&self, header: Header) -> bool {
        self.headers.contains(&header)
    }
}

impl Default for Config {
    /// Every known header, no diagnostic limit.
    fn default() -> Self {
        Config {
            headers: Header::ALL.into_iter().collect(),
            max_diagnostics: None,
        }
    }
}
