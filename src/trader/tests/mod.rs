//! Cross-module tests for the trader pipeline.
