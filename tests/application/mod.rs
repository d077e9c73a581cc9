mod engine_registry_test;
mod model_slot_test;
mod output_normalizer_test;
