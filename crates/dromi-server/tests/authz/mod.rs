// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod support;

mod labels;
mod todo_items;
mod todo_lists;
mod workspaces;
