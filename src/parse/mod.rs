mod adjlist;
