mod semiring_law_tests;
