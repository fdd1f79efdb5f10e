// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod datasets;
pub mod debts;
pub mod goals;
pub mod importer;
pub mod recurring;
pub mod transactions;
