pub mod gradient_map;
