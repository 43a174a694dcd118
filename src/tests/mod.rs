mod casedata;
