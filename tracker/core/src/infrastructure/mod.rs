// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod db;
pub mod repositories;
