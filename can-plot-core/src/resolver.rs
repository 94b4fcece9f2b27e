//! Identifier resolution
//!
//! Users refer to a channel either by its symbolic key or by its numeric bus
//! code (decimal, or hex with a `0x` prefix). Resolution tries the symbolic key
//! first and falls back to the code map built from the channels' `hex_id`
//! attributes.

use crate::config::{CodeCollisionPolicy, ContainerLayout};
use crate::container::LogContainer;
use crate::types::{PlotError, Result};
use std::collections::{HashMap, HashSet};

/// Parse a numeric code token: `0x`/`0X` prefix is hex, anything else decimal
pub fn parse_numeric_code(token: &str) -> Option<u32> {
    let token = token.trim();
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

/// A channel that lost its numeric code to a later channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCollision {
    pub code: u32,
    /// Channel no longer reachable by this code
    pub shadowed: String,
    /// Channel the code now maps to
    pub winner: String,
}

/// Numeric code to channel key lookup table
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    codes: HashMap<u32, String>,
    collisions: Vec<CodeCollision>,
}

impl IdentifierMap {
    /// Build the map from `(key, code)` pairs in container order
    pub fn from_codes<I, K>(entries: I, policy: CodeCollisionPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        let mut map = Self::default();

        for (key, code) in entries {
            let key = key.into();
            if let Some(previous) = map.codes.get(&code) {
                if policy == CodeCollisionPolicy::Reject {
                    return Err(PlotError::DuplicateCode {
                        code,
                        first: previous.clone(),
                        second: key,
                    });
                }

                log::warn!(
                    "Numeric code 0x{:X} of {} is shadowed by {}",
                    code,
                    previous,
                    key
                );
                map.collisions.push(CodeCollision {
                    code,
                    shadowed: previous.clone(),
                    winner: key.clone(),
                });
            }
            map.codes.insert(code, key);
        }

        Ok(map)
    }

    /// Build the map by reading every channel's code attribute
    pub fn build<C>(container: &C, keys: &[String], policy: CodeCollisionPolicy) -> Result<Self>
    where
        C: LogContainer + ?Sized,
    {
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            match container.read_attributes(key)?.code {
                Some(code) => entries.push((key.clone(), code)),
                None => log::debug!("Channel {} has no numeric code", key),
            }
        }

        let map = Self::from_codes(entries, policy)?;
        log::debug!("Identifier map holds {} codes", map.len());
        Ok(map)
    }

    /// Channel key for a numeric code
    pub fn get(&self, code: u32) -> Option<&str> {
        self.codes.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes that were claimed by more than one channel
    pub fn collisions(&self) -> &[CodeCollision] {
        &self.collisions
    }
}

/// Outcome of resolving a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Token matched a channel key
    Symbolic { key: String },
    /// Token parsed as a code that maps to a channel
    Numeric { code: u32, key: String },
    /// Neither lookup matched
    Unresolved,
}

impl Resolution {
    /// Channel key, if resolved
    pub fn key(&self) -> Option<&str> {
        match self {
            Resolution::Symbolic { key } | Resolution::Numeric { key, .. } => Some(key),
            Resolution::Unresolved => None,
        }
    }
}

/// A token together with the channel it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub token: String,
    pub key: String,
}

/// Result of resolving a batch of tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedChannels {
    /// Resolved channels in token order (duplicates kept)
    pub resolved: Vec<ResolvedChannel>,
    /// Tokens that matched nothing
    pub unresolved: Vec<String>,
}

/// Maps user tokens to channel keys of one container
pub struct IdentifierResolver {
    keys: HashSet<String>,
    codes: IdentifierMap,
    layout: ContainerLayout,
}

impl IdentifierResolver {
    /// Read keys and codes from a container
    pub fn for_container<C>(container: &C, policy: CodeCollisionPolicy) -> Result<Self>
    where
        C: LogContainer + ?Sized,
    {
        let keys = container.channel_keys()?;
        let codes = IdentifierMap::build(container, &keys, policy)?;
        Ok(Self {
            keys: keys.into_iter().collect(),
            codes,
            layout: container.layout().clone(),
        })
    }

    /// The numeric code map used for fallback lookups
    pub fn identifier_map(&self) -> &IdentifierMap {
        &self.codes
    }

    /// Resolve one token: symbolic key first, numeric code second
    pub fn resolve(&self, token: &str) -> Resolution {
        let key = self.layout.key_for_token(token);
        if self.keys.contains(key.as_ref()) {
            log::trace!("{} resolved as symbolic key", token);
            return Resolution::Symbolic {
                key: key.into_owned(),
            };
        }

        if let Some(code) = parse_numeric_code(token) {
            if let Some(key) = self.codes.get(code) {
                log::trace!("{} resolved as code 0x{:X} -> {}", token, code, key);
                return Resolution::Numeric {
                    code,
                    key: key.to_string(),
                };
            }
        }

        Resolution::Unresolved
    }

    /// Resolve all tokens, skipping the ones that match nothing
    pub fn resolve_all<S: AsRef<str>>(&self, tokens: &[S]) -> ResolvedChannels {
        let mut result = ResolvedChannels::default();

        for token in tokens {
            let token = token.as_ref();
            match self.resolve(token) {
                Resolution::Symbolic { key } | Resolution::Numeric { key, .. } => {
                    result.resolved.push(ResolvedChannel {
                        token: token.to_string(),
                        key,
                    });
                }
                Resolution::Unresolved => {
                    log::warn!("Could not find {} in log file!", token);
                    result.unresolved.push(token.to_string());
                }
            }
        }

        result
    }
}
