// SPDX-License-Identifier: GPL-3.0-or-later

pub mod application;
pub mod args;
pub mod config;
pub mod output;
pub mod semantic;
