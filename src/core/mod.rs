// ─── Pickaxe Core ───
// Content acquisition pipeline for a Minecraft launcher backend.
//
// Architecture:
//   core/
//     config       — game dirs, download sources, fetcher tuning
//     manifest     — version manifest model + OS rule evaluation
//     maven        — coordinate parser + repo path synthesis
//     replacement  — version-gated library substitution rules
//     verify       — streamed SHA-1 integrity checks
//     downloader/  — mirrored streaming fetcher
//     assets       — asset index model + source seam
//     plan/        — manifest → ordered download plan
//     orchestrator/— plan driver, state machine, progress sink

pub mod assets;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod manifest;
pub mod maven;
pub mod orchestrator;
pub mod plan;
pub mod replacement;
pub mod verify;
