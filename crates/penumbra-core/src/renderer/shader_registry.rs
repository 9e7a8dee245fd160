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

//! Process-wide registry of shader sources, keyed by effect name.
//!
//! Backends look up an effect's source here the first time a variant is
//! requested. Lanes register their built-in shaders lazily.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

static SHADER_STORE: Lazy<Mutex<HashMap<String, &'static str>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers `source` under `name`.
///
/// Returns `false` and leaves the existing entry untouched if `name` is taken.
pub fn register_shader(name: &str, source: &'static str) -> bool {
    let mut store = match SHADER_STORE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if store.contains_key(name) {
        return false;
    }
    log::debug!("ShaderRegistry: registered effect '{name}'");
    store.insert(name.to_owned(), source);
    true
}

/// Returns the source registered under `name`.
pub fn shader_source(name: &str) -> Option<&'static str> {
    let store = match SHADER_STORE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    store.get(name).copied()
}
