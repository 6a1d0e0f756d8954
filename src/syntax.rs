//! Character-to-role tables consumed by the lexer.
//!
//! A [`SyntaxConfig`] maps every special character to exactly one role. The
//! wildcard `*` and the escape `\` are fixed and can never be reassigned.
//! Every constructor validates the tables and rebuilds the matcher used to
//! recognise simple paths, so a config value is always internally consistent.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{ContainerRole, PrefixRole, SeparatorRole};
use crate::error::ConfigError;

pub const WILDCARD: char = '*';
pub const ESCAPE: char = '\\';

/// What a single character means to the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharRole {
    Prefix(PrefixRole),
    Separator(SeparatorRole),
    Opener { role: ContainerRole, closer: char },
    Closer(ContainerRole),
}

static DEFAULT_SYNTAX: LazyLock<SyntaxConfig> = LazyLock::new(|| {
    SyntaxConfig::new(
        default_prefixes(),
        default_separators(),
        default_containers(),
    )
    .expect("default syntax tables are consistent")
});

pub fn default_prefixes() -> HashMap<char, PrefixRole> {
    HashMap::from([
        ('^', PrefixRole::Parent),
        ('~', PrefixRole::Root),
        ('%', PrefixRole::Placeholder),
        ('@', PrefixRole::Context),
    ])
}

pub fn default_separators() -> HashMap<char, SeparatorRole> {
    HashMap::from([
        ('.', SeparatorRole::Property),
        (',', SeparatorRole::Collection),
        ('<', SeparatorRole::Each),
    ])
}

pub fn default_containers() -> HashMap<char, (ContainerRole, char)> {
    HashMap::from([
        ('[', (ContainerRole::Property, ']')),
        ('\'', (ContainerRole::SingleQuote, '\'')),
        ('"', (ContainerRole::DoubleQuote, '"')),
        ('(', (ContainerRole::Call, ')')),
        ('{', (ContainerRole::EvalProperty, '}')),
    ])
}

#[derive(Debug, Clone)]
pub struct SyntaxConfig {
    prefixes: HashMap<char, PrefixRole>,
    separators: HashMap<char, SeparatorRole>,
    containers: HashMap<char, (ContainerRole, char)>,
    closers: HashMap<char, ContainerRole>,
    property: char,
    simple: bool,
    /// Matches any special character other than the property separator
    special: Option<Regex>,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        DEFAULT_SYNTAX.clone()
    }
}

impl SyntaxConfig {
    /// Builds a config from full tables, rejecting characters with more than one role.
    pub fn new(
        prefixes: HashMap<char, PrefixRole>,
        separators: HashMap<char, SeparatorRole>,
        containers: HashMap<char, (ContainerRole, char)>,
    ) -> Result<Self, ConfigError> {
        let mut claimed: HashMap<char, String> = HashMap::new();
        let mut claim = |ch: char, role: String| -> Result<(), ConfigError> {
            if ch == WILDCARD || ch == ESCAPE {
                return Err(ConfigError::Reserved(ch));
            }
            match claimed.get(&ch) {
                Some(first) => Err(ConfigError::Conflict {
                    ch,
                    first: first.clone(),
                    second: role,
                }),
                None => {
                    claimed.insert(ch, role);
                    Ok(())
                }
            }
        };

        for (&ch, role) in &prefixes {
            claim(ch, format!("prefix {role:?}"))?;
        }
        for (&ch, role) in &separators {
            claim(ch, format!("separator {role:?}"))?;
        }
        for (&opener, &(role, closer)) in &containers {
            claim(opener, format!("{role:?} container opener"))?;
            // Quote containers open and close with the same character.
            if closer != opener {
                claim(closer, format!("{role:?} container closer"))?;
            }
        }

        let property = separators
            .iter()
            .find(|(_, role)| **role == SeparatorRole::Property)
            .map(|(ch, _)| *ch)
            .ok_or(ConfigError::MissingPropertySeparator)?;

        let closers = containers
            .values()
            .map(|&(role, closer)| (closer, role))
            .collect();

        let mut config = SyntaxConfig {
            prefixes,
            separators,
            containers,
            closers,
            property,
            simple: false,
            special: None,
        };
        config.special = Some(config.build_matcher()?);
        Ok(config)
    }

    /// The restricted grammar: one separator, nothing else is special.
    pub fn simple(separator: char) -> Result<Self, ConfigError> {
        let mut config = SyntaxConfig::new(
            HashMap::new(),
            HashMap::from([(separator, SeparatorRole::Property)]),
            HashMap::new(),
        )?;
        config.simple = true;
        config.special = None;
        Ok(config)
    }

    pub fn with_prefixes(&self, prefixes: HashMap<char, PrefixRole>) -> Result<Self, ConfigError> {
        SyntaxConfig::new(prefixes, self.separators.clone(), self.containers.clone())
    }

    pub fn with_separators(
        &self,
        separators: HashMap<char, SeparatorRole>,
    ) -> Result<Self, ConfigError> {
        SyntaxConfig::new(self.prefixes.clone(), separators, self.containers.clone())
    }

    pub fn with_containers(
        &self,
        containers: HashMap<char, (ContainerRole, char)>,
    ) -> Result<Self, ConfigError> {
        SyntaxConfig::new(self.prefixes.clone(), self.separators.clone(), containers)
    }

    /// Rebinds one prefix role to a new character.
    pub fn with_prefix(&self, role: PrefixRole, ch: char) -> Result<Self, ConfigError> {
        if let Some(existing) = self.prefixes.get(&ch).filter(|r| **r != role) {
            return Err(rebound(ch, format!("prefix {existing:?}"), format!("prefix {role:?}")));
        }
        let mut prefixes = self.prefixes.clone();
        prefixes.retain(|_, r| *r != role);
        prefixes.insert(ch, role);
        self.with_prefixes(prefixes)
    }

    pub fn with_separator(&self, role: SeparatorRole, ch: char) -> Result<Self, ConfigError> {
        if let Some(existing) = self.separators.get(&ch).filter(|r| **r != role) {
            return Err(rebound(ch, format!("separator {existing:?}"), format!("separator {role:?}")));
        }
        let mut separators = self.separators.clone();
        separators.retain(|_, r| *r != role);
        separators.insert(ch, role);
        self.with_separators(separators)
    }

    pub fn with_container(
        &self,
        role: ContainerRole,
        opener: char,
        closer: char,
    ) -> Result<Self, ConfigError> {
        if let Some((existing, _)) = self.containers.get(&opener).filter(|(r, _)| *r != role) {
            return Err(rebound(
                opener,
                format!("{existing:?} container opener"),
                format!("{role:?} container opener"),
            ));
        }
        let mut containers = self.containers.clone();
        containers.retain(|_, (r, _)| *r != role);
        containers.insert(opener, (role, closer));
        self.with_containers(containers)
    }

    pub fn is_simple_mode(&self) -> bool {
        self.simple
    }

    pub fn property_separator(&self) -> char {
        self.property
    }

    pub fn classify(&self, ch: char) -> Option<CharRole> {
        if let Some(&role) = self.prefixes.get(&ch) {
            return Some(CharRole::Prefix(role));
        }
        if let Some(&role) = self.separators.get(&ch) {
            return Some(CharRole::Separator(role));
        }
        if let Some(&(role, closer)) = self.containers.get(&ch) {
            return Some(CharRole::Opener { role, closer });
        }
        self.closers.get(&ch).map(|&role| CharRole::Closer(role))
    }

    /// Opener and closer of the container bound to `role`, if any.
    pub fn container(&self, role: ContainerRole) -> Option<(char, char)> {
        self.containers
            .iter()
            .find(|(_, (r, _))| *r == role)
            .map(|(&opener, &(_, closer))| (opener, closer))
    }

    /// True when the path needs no tokenizing beyond splitting on the property separator.
    pub fn is_simple_path(&self, path: &str) -> bool {
        match &self.special {
            Some(matcher) => !matcher.is_match(path),
            None => true,
        }
    }

    /// True for every character that has a role, including the property
    /// separator, the wildcard and the escape.
    pub fn is_special(&self, ch: char) -> bool {
        if self.simple {
            return ch == self.property;
        }
        ch == WILDCARD || ch == ESCAPE || self.classify(ch).is_some()
    }

    /// Prefixes every special character in `segment` with the escape character.
    ///
    /// The simple grammar has no escapes, so the segment is returned unchanged there.
    pub fn escape(&self, segment: &str) -> String {
        if self.simple {
            return segment.to_owned();
        }
        let mut escaped = String::with_capacity(segment.len());
        for ch in segment.chars() {
            if self.is_special(ch) {
                escaped.push(ESCAPE);
            }
            escaped.push(ch);
        }
        escaped
    }

    /// Renders a segment so that it tokenizes back to exactly one plain name.
    ///
    /// The empty name is always quoted, since a bare empty segment is a syntax error.
    pub fn quote(&self, segment: &str) -> String {
        let plain = !segment.is_empty() && !segment.chars().any(|ch| self.is_special(ch));
        if self.simple || plain {
            return segment.to_owned();
        }
        let quotes = self
            .container(ContainerRole::SingleQuote)
            .or_else(|| self.container(ContainerRole::DoubleQuote));
        match quotes {
            Some((opener, closer)) => {
                let mut quoted = String::with_capacity(segment.len() + 2);
                quoted.push(opener);
                for ch in segment.chars() {
                    if ch == closer || ch == ESCAPE {
                        quoted.push(ESCAPE);
                    }
                    quoted.push(ch);
                }
                quoted.push(closer);
                quoted
            }
            None => self.escape(segment),
        }
    }

    fn build_matcher(&self) -> Result<Regex, ConfigError> {
        let specials = self
            .prefixes
            .keys()
            .copied()
            .chain(self.separators.keys().copied().filter(|ch| *ch != self.property))
            .chain(self.containers.keys().copied())
            .chain(self.closers.keys().copied())
            .chain([WILDCARD, ESCAPE]);

        let mut class = String::from("[");
        for ch in specials {
            class.push_str(&regex::escape(&ch.to_string()));
        }
        class.push(']');
        Ok(Regex::new(&class)?)
    }
}

/// Rebinding one role onto a character that already has a different role of the same kind.
fn rebound(ch: char, first: String, second: String) -> ConfigError {
    ConfigError::Conflict { ch, first, second }
}
