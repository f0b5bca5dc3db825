// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod events;
pub mod graph;
pub mod repository;
pub mod workflow;
