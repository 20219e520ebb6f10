// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::logs::KeyValue;

/// Returns the value of the first attribute whose key is `key`, or `None` if
/// no attribute matches.
///
/// Only string values are read. A matching attribute holding any other kind
/// of value, or no value at all, yields `Some("")` and is counted as the
/// empty string.
pub fn extract<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attribute| attribute.key == key)
        .map(|attribute| attribute.value.as_ref().map_or("", |value| value.as_str()))
}
