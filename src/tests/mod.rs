//! End-to-end tests: configuration file on disk through to deleted objects.
