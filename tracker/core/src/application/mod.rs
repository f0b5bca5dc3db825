// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod recorder;
pub mod tracker;
