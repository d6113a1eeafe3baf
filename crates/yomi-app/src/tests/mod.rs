mod tap_tests;
