macro_rules! debug_path {
    ($description: expr, $path: ident) => {
        tracing::debug!(
            "{LAUNCHER} - {} exists at {:?}: {}",
            $description,
            $path,
            $path.exists()
        );
    };
}
pub(crate) use debug_path;

macro_rules! warn_no_games {
    ($path: expr) => {
        tracing::warn!("{LAUNCHER} - No app manifests found in library: {:?}", $path);
    };
}
pub(crate) use warn_no_games;

macro_rules! warn_skipped_manifest {
    ($path: expr, $err: expr) => {
        tracing::warn!(
            "{LAUNCHER} - Skipped app manifest at {:?}: {}",
            $path,
            $err
        );
    };
}
pub(crate) use warn_skipped_manifest;
