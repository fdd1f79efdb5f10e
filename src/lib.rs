// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod adapter;
pub mod cli;
pub mod commands;
pub mod controller;
pub mod error;
pub mod models;
pub mod paths;
pub mod remote;
pub mod store;
pub mod sync;
pub mod utils;
pub mod watchdog;
