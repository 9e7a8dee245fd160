// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shader variant selection: preprocessor defines and effect keys.

use crate::scene::MeshId;
use std::collections::BTreeMap;
use std::fmt;

/// The value of a single shader define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineValue {
    /// A flag define (`#define NAME` when `true`, absent when `false`).
    Bool(bool),
    /// An integer define (`#define NAME 3`).
    Int(i32),
}

/// An ordered table of shader defines used to select a shader variant.
///
/// Materials fill one table per draw; shadow generators inject their own
/// entries through [`ShadowGenerator::prepare_shader_defines`].
///
/// [`ShadowGenerator::prepare_shader_defines`]: crate::renderer::traits::ShadowGenerator::prepare_shader_defines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineTable {
    entries: BTreeMap<String, DefineValue>,
}

impl DefineTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a flag define.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.entries.insert(name.into(), DefineValue::Bool(value));
    }

    /// Sets an integer define.
    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.entries.insert(name.into(), DefineValue::Int(value));
    }

    /// Returns the raw value of a define.
    pub fn get(&self, name: &str) -> Option<DefineValue> {
        self.entries.get(name).copied()
    }

    /// Returns `true` if `name` is present as a `true` flag.
    pub fn is_enabled(&self, name: &str) -> bool {
        matches!(self.get(name), Some(DefineValue::Bool(true)))
    }

    /// Returns the integer value of `name`, if it is an integer define.
    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name) {
            Some(DefineValue::Int(v)) => Some(v),
            _ => None,
        }
    }

    /// Returns the number of entries, including `false` flags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DefineValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Renders the enabled entries as preprocessor lines.
    pub fn to_preprocessor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DefineTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            match value {
                DefineValue::Bool(true) => writeln!(f, "#define {name}")?,
                DefineValue::Bool(false) => {}
                DefineValue::Int(v) => writeln!(f, "#define {name} {v}")?,
            }
        }
        Ok(())
    }
}

/// Identifies one compiled shader variant for one drawable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectKey {
    /// Name of the effect in the shader registry.
    pub effect: &'static str,
    /// The drawable the variant is compiled for.
    pub drawable: MeshId,
    /// Defines selecting the variant.
    pub defines: DefineTable,
}
